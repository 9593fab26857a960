// @generated
// This file wires up buf-generated protobuf code
// Note: the prost file already include!()s the tonic file

pub mod tasklist {
    include!("tasklist.rs");
    // tasklist.tonic.rs is auto-included by tasklist.rs
}
