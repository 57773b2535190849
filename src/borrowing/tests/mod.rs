//! Unit tests for the borrowing module.
//!
//! Tests are organised by concept: the transition table, the record
//! aggregate, handover codes, the lifecycle service, settlement and
//! persistence row conversion.
