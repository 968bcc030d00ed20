//! Shared, read-only collaborators for stage bodies.

use polybuild_api::{Api, MethodRegistry, Params};
use serde_json::Value;

use crate::error::StageFailure;

/// Longest parameter value echoed in debug logs.
const LOG_VALUE_LIMIT: usize = 48;

/// API access for stages: key resolution, dry-run gating, logging.
pub struct BuildContext<'a> {
    api: &'a dyn Api,
    registry: MethodRegistry,
    dry_run: bool,
}

impl<'a> BuildContext<'a> {
    pub fn new(api: &'a dyn Api, dry_run: bool) -> Self {
        Self {
            api,
            registry: MethodRegistry::polygon(),
            dry_run,
        }
    }

    pub fn with_registry(mut self, registry: MethodRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve `key` and call the remote method.
    ///
    /// Key resolution happens first, so an unknown key fails even in a dry
    /// run. Under dry-run, mutating methods are logged and answered with
    /// `Value::Null` without touching the network; read-only ones are sent.
    pub fn call(&self, key: &str, params: Params) -> Result<Value, StageFailure> {
        let entry = self.registry.resolve(key)?;
        tracing::debug!(method = entry.name, params = %summarize(&params), "call");
        if self.dry_run && entry.mutating {
            tracing::info!(method = entry.name, "[dry-run] skipped {}", entry.name);
            return Ok(Value::Null);
        }
        Ok(self.api.call(entry.name, &params)?)
    }
}

/// `k=v` pairs for logging, long values cut short.
fn summarize(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| {
            if v.chars().count() > LOG_VALUE_LIMIT {
                let head: String = v.chars().take(LOG_VALUE_LIMIT).collect();
                format!("{k}={head}… ({} chars)", v.chars().count())
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use polybuild_api::{keys, ApiError, MethodEntry};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        methods: RefCell<Vec<String>>,
    }

    impl Api for Recorder {
        fn call(&self, method: &str, _params: &Params) -> Result<Value, ApiError> {
            self.methods.borrow_mut().push(method.to_string());
            Ok(Value::Bool(true))
        }
    }

    #[test]
    fn resolves_key_to_remote_name() {
        let api = Recorder::default();
        let ctx = BuildContext::new(&api, false);
        let v = ctx.call(keys::SAVE_TAGS, Params::new()).unwrap();
        assert_eq!(v, Value::Bool(true));
        assert_eq!(*api.methods.borrow(), vec!["problem.saveTags"]);
    }

    #[test]
    fn dry_run_skips_mutating_but_sends_reads() {
        let api = Recorder::default();
        let ctx = BuildContext::new(&api, true);
        assert_eq!(ctx.call(keys::SAVE_FILE, Params::new()).unwrap(), Value::Null);
        ctx.call(keys::LIST_PROBLEMS, Params::new()).unwrap();
        assert_eq!(*api.methods.borrow(), vec!["problems.list"]);
    }

    #[test]
    fn unknown_key_fails_before_any_call_even_in_dry_run() {
        let api = Recorder::default();
        let ctx = BuildContext::new(&api, true);
        let err = ctx.call("files_save", Params::new()).unwrap_err();
        assert!(matches!(err, StageFailure::Method(_)));
        assert!(api.methods.borrow().is_empty());
    }

    #[test]
    fn unconfirmed_key_is_never_sent() {
        let api = Recorder::default();
        let ctx = BuildContext::new(&api, false).with_registry(MethodRegistry::new([(
            keys::BUILD_PACKAGE,
            MethodEntry::write("problem.buildPackage").unconfirmed(),
        )]));
        let err = ctx.call(keys::BUILD_PACKAGE, Params::new()).unwrap_err();
        assert!(err.to_string().contains("problem.buildPackage"));
        assert!(api.methods.borrow().is_empty());
    }

    #[test]
    fn summarize_truncates_long_values() {
        let long = "x".repeat(100);
        let s = summarize(&Params::new().with("file", &long).with("problemId", 1));
        assert!(s.contains("(100 chars)"));
        assert!(s.ends_with("problemId=1"));
    }
}
