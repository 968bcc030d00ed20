//! Operation-key → remote method-name registry.
//!
//! Only method names live here so that string literals for the remote API
//! are not scattered across the pipeline. The table is assembled once and
//! never mutated. Resolving an unknown key, or a key whose remote name has
//! not been confirmed against the service, fails immediately instead of
//! sending a guessed call.

use std::collections::BTreeMap;

use crate::error::MethodError;

/// Operation keys used by the build pipeline.
pub mod keys {
    pub const LIST_PROBLEMS: &str = "list_problems";
    pub const CREATE_PROBLEM: &str = "create_problem";
    pub const PROBLEM_INFO: &str = "problem_info";
    pub const UPDATE_INFO: &str = "update_info";
    pub const SAVE_TAGS: &str = "save_tags";
    pub const SAVE_STATEMENT: &str = "save_statement";
    pub const SAVE_FILE: &str = "save_file";
    pub const SET_CHECKER: &str = "set_checker";
    pub const SET_VALIDATOR: &str = "set_validator";
    pub const SAVE_SOLUTION: &str = "save_solution";
    pub const SAVE_TEST: &str = "save_test";
    pub const SAVE_SCRIPT: &str = "save_script";
    pub const COMMIT_CHANGES: &str = "commit_changes";
    pub const BUILD_PACKAGE: &str = "build_package";
}

/// One registry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodEntry {
    /// Remote method name, e.g. `problem.saveFile`.
    pub name: &'static str,
    /// Whether the name has been verified against the service.
    pub confirmed: bool,
    /// Whether the call changes remote state. Dry runs skip these.
    pub mutating: bool,
}

impl MethodEntry {
    pub const fn read(name: &'static str) -> Self {
        Self {
            name,
            confirmed: true,
            mutating: false,
        }
    }

    pub const fn write(name: &'static str) -> Self {
        Self {
            name,
            confirmed: true,
            mutating: true,
        }
    }

    /// Mark the remote name as a guess; resolving it will fail.
    pub const fn unconfirmed(self) -> Self {
        Self {
            confirmed: false,
            ..self
        }
    }
}

const POLYGON_METHODS: &[(&str, MethodEntry)] = &[
    // Problems
    (keys::LIST_PROBLEMS, MethodEntry::read("problems.list")),
    (keys::CREATE_PROBLEM, MethodEntry::write("problem.create")),
    (keys::PROBLEM_INFO, MethodEntry::read("problem.info")),
    (keys::UPDATE_INFO, MethodEntry::write("problem.updateInfo")),
    (keys::COMMIT_CHANGES, MethodEntry::write("problem.commitChanges")),
    (keys::BUILD_PACKAGE, MethodEntry::write("problem.buildPackage")),
    ("packages", MethodEntry::read("problem.packages")),
    // Tags
    (keys::SAVE_TAGS, MethodEntry::write("problem.saveTags")),
    ("tags", MethodEntry::read("problem.viewTags")),
    // Statements
    ("statements", MethodEntry::read("problem.statements")),
    (keys::SAVE_STATEMENT, MethodEntry::write("problem.saveStatement")),
    // Files
    ("files", MethodEntry::read("problem.files")),
    (keys::SAVE_FILE, MethodEntry::write("problem.saveFile")),
    ("view_file", MethodEntry::read("problem.viewFile")),
    // Checker / validator
    ("checker", MethodEntry::read("problem.checker")),
    (keys::SET_CHECKER, MethodEntry::write("problem.setChecker")),
    ("validator", MethodEntry::read("problem.validator")),
    (keys::SET_VALIDATOR, MethodEntry::write("problem.setValidator")),
    // Solutions
    ("solutions", MethodEntry::read("problem.solutions")),
    (keys::SAVE_SOLUTION, MethodEntry::write("problem.saveSolution")),
    // Scripts and tests
    ("script", MethodEntry::read("problem.script")),
    (keys::SAVE_SCRIPT, MethodEntry::write("problem.saveScript")),
    ("tests", MethodEntry::read("problem.tests")),
    (keys::SAVE_TEST, MethodEntry::write("problem.saveTest")),
];

/// Immutable lookup table of remote methods.
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    entries: BTreeMap<&'static str, MethodEntry>,
}

impl MethodRegistry {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, MethodEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The Polygon method table.
    pub fn polygon() -> Self {
        Self::new(POLYGON_METHODS.iter().copied())
    }

    /// Look up `key`, failing for unknown or unconfirmed entries.
    pub fn resolve(&self, key: &str) -> Result<MethodEntry, MethodError> {
        let entry = self
            .entries
            .get(key)
            .copied()
            .ok_or_else(|| MethodError::Unknown {
                key: key.to_string(),
            })?;
        if !entry.confirmed {
            return Err(MethodError::Unconfirmed {
                key: key.to_string(),
                assumed: entry.name,
            });
        }
        Ok(entry)
    }

    /// All rows, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, MethodEntry)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::polygon()
    }
}
