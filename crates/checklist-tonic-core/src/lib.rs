#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access `checklist` via
// `checklist_tonic_core::checklist`
pub use checklist;

/// Generated message types, client stubs and server traits.
pub mod proto {
    pub mod checklist {
        tonic::include_proto!("checklist");
    }

    pub mod helloworld {
        tonic::include_proto!("helloworld");
    }

    /// Encoded descriptor set of both packages, for server reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("checklist_descriptor");
}
