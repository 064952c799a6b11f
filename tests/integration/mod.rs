//! Integration Tests Module
//!
//! End-to-end coverage of the generation pipeline: the gated service running
//! theme/sections/ui stages against scripted models, transactional merging
//! of out-of-order sections into a document, and the orchestrated guided
//! flow from first question to finished page.

// Shared scripted models, build fixtures and theme payloads
mod support;

// Service pipeline and response envelope tests
mod generation_test;

// Document store merging, ordering and token tests
mod document_merge_test;

// Orchestrated guided-flow tests
mod flow_test;
