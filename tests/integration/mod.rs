//! Integration Tests Module
//!
//! End-to-end tests for Breezer through the public API: request routing,
//! the tool-call continuation protocol, store expiry and the local tool
//! executor.

// Scripted provider and state builders shared by the suites
mod support;

// Classification and handler routing
mod routing_test;

// Pause / resume protocol through the agent service
mod protocol_test;

// Tool execution feeding results back into a paused request
mod tool_loop_test;
