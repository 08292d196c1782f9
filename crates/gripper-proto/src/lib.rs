//! Generated gRPC protocol definitions for GRIPSource adapters.
//!
//! This crate provides the protocol buffer definitions and generated code
//! spoken between a GRIP query engine and the data sources it federates,
//! plus the conversion between JSON documents and `google.protobuf.Struct`.

pub mod gripper {
    tonic::include_proto!("gripper");
}

pub mod convert;

// Re-export commonly used types for convenience
pub use convert::{json_from_struct, struct_from_json};
pub use gripper::*;
