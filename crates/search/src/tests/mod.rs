//! Cross-module tests: ranking properties and answer orchestration.

mod rag;
