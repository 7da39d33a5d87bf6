// ABOUTME: Release lifecycle state markers for the type state pattern.
// ABOUTME: Installed and Ready carry the number of attempts the install took.

/// Started, nothing checked yet.
/// Available actions: `lint()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// Chart and values validated.
/// Available actions: `preview()`, `install()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Linted;

/// `upgrade --install` succeeded.
/// Available actions: `wait()`, `skip_wait()`
#[derive(Debug, Clone, Copy)]
pub struct Installed {
    pub(crate) attempts: u32,
}

/// Installed and, when requested, confirmed ready.
/// Available actions: `succeed()`
#[derive(Debug, Clone, Copy)]
pub struct Ready {
    pub(crate) attempts: u32,
}
