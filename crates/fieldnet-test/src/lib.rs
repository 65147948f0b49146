//! Mock collaborators and fixtures for exercising the bring-up sequence
//! without touching host state.
//!
//! Each mock records its calls into a shared [`CallLog`] so tests can assert
//! ordering across collaborators, and can be scripted to fail on a specific
//! call to exercise abort paths.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ipnetwork::Ipv4Network;

use fieldnet_common::shell::ExecResult;
use fieldnet_common::{FieldNetError, FieldNetResult};
use fieldnetd::dhcp::ServiceManager;
use fieldnetd::firewall::CommandRunner;
use fieldnetd::ip_operations::NetIf;
use fieldnetd::types::LinkHandle;

pub mod fixtures;

/// Shared, cloneable record of collaborator calls, in invocation order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }
}

/// Interface service over a fixed set of links, recording every call.
///
/// Call entries look like `clear eth1` and `add 10.0.100.1/24 eth1`. The
/// failing call itself is recorded before the injected error returns.
pub struct MockNetIf {
    pub log: CallLog,
    links: Vec<String>,
    fail_on: Option<String>,
}

impl MockNetIf {
    pub fn new<S: AsRef<str>>(links: &[S]) -> Self {
        Self {
            log: CallLog::new(),
            links: links.iter().map(|s| s.as_ref().to_string()).collect(),
            fail_on: None,
        }
    }

    /// Fails any mutating call whose log entry starts with this prefix.
    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    fn check(&self, entry: &str) -> FieldNetResult<()> {
        match &self.fail_on {
            Some(prefix) if entry.starts_with(prefix.as_str()) => Err(FieldNetError::internal(
                format!("injected failure on '{entry}'"),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl NetIf for MockNetIf {
    async fn exists(&self, name: &str) -> bool {
        self.links.iter().any(|l| l == name)
    }

    async fn lookup(&self, name: &str) -> FieldNetResult<LinkHandle> {
        self.links
            .iter()
            .position(|l| l == name)
            .map(|i| LinkHandle::new(name, i as u32 + 1))
            .ok_or_else(|| FieldNetError::link_not_found(name))
    }

    async fn clear_addresses(&self, link: &LinkHandle) -> FieldNetResult<()> {
        let entry = format!("clear {}", link.name());
        self.log.record(&entry);
        self.check(&entry)
    }

    async fn add_address(&self, link: &LinkHandle, cidr: Ipv4Network) -> FieldNetResult<()> {
        let entry = format!("add {} {}", cidr, link.name());
        self.log.record(&entry);
        self.check(&entry)
    }
}

/// Service manager whose ActiveState answer is scripted.
pub struct MockServiceManager {
    pub log: CallLog,
    active_state: String,
}

impl MockServiceManager {
    pub fn new() -> Self {
        Self {
            log: CallLog::new(),
            active_state: "active".to_string(),
        }
    }

    /// Answers every property query with this state.
    pub fn with_active_state(mut self, state: &str) -> Self {
        self.active_state = state.to_string();
        self
    }
}

impl Default for MockServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceManager for MockServiceManager {
    async fn stop(&self, unit: &str) -> FieldNetResult<()> {
        self.log.record(format!("stop {unit}"));
        Ok(())
    }

    async fn restart(&self, unit: &str) -> FieldNetResult<()> {
        self.log.record(format!("restart {unit}"));
        Ok(())
    }

    async fn get_property(&self, unit: &str, key: &str) -> FieldNetResult<String> {
        self.log.record(format!("get {unit} {key}"));
        Ok(self.active_state.clone())
    }
}

/// Command runner returning a scripted exit code.
pub struct MockCommandRunner {
    pub log: CallLog,
    exit_code: i32,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            log: CallLog::new(),
            exit_code: 0,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> FieldNetResult<ExecResult> {
        if args.is_empty() {
            self.log.record(program);
        } else {
            self.log.record(format!("{} {}", program, args.join(" ")));
        }
        Ok(ExecResult {
            exit_code: self.exit_code,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
