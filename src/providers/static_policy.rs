// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ordered access rules from the configuration file.
//!
//! ## Matching
//!
//! Rules are evaluated top to bottom and the first rule matching both the
//! object and the subject wins. When nothing matches, the default policy
//! applies.
//!
//! A rule with subject criteria never matches an anonymous request. The
//! result then reports `has_subject` so the caller can ask for a login
//! instead of answering forbidden.

use async_trait::async_trait;
use axum::http::Method;

use crate::authz::{Object, PolicyMatch, PolicyMatcher, ProviderError, RequiredLevel, Subject};
use crate::config::AccessControlConfig;
use crate::error::ConfigError;

/// Who a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectMatcher {
    User(String),
    Group(String),
}

impl SubjectMatcher {
    /// Parse `user:<name>` or `group:<name>`.
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, name) = value.trim().split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        match kind.trim() {
            "user" => Some(SubjectMatcher::User(name.to_string())),
            "group" => Some(SubjectMatcher::Group(name.to_string())),
            _ => None,
        }
    }

    fn matches(&self, subject: &Subject) -> bool {
        match self {
            SubjectMatcher::User(name) => subject.username == *name,
            SubjectMatcher::Group(group) => subject.in_group(group),
        }
    }
}

/// One access rule. Empty criteria match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    domains: Vec<String>,
    resources: Vec<String>,
    methods: Vec<Method>,
    subjects: Vec<SubjectMatcher>,
    policy: RequiredLevel,
}

impl AccessRule {
    pub fn new(policy: RequiredLevel) -> Self {
        Self {
            domains: Vec::new(),
            resources: Vec::new(),
            methods: Vec::new(),
            subjects: Vec::new(),
            policy,
        }
    }

    /// Exact hosts or `*.` wildcards.
    pub fn with_domains(mut self, domains: &[&str]) -> Self {
        self.domains = domains.iter().map(|d| d.to_ascii_lowercase()).collect();
        self
    }

    /// Path prefixes.
    pub fn with_resources(mut self, resources: &[&str]) -> Self {
        self.resources = resources.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn with_methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    pub fn with_subjects(mut self, subjects: Vec<SubjectMatcher>) -> Self {
        self.subjects = subjects;
        self
    }

    fn matches_object(&self, object: &Object) -> bool {
        let host = object.host().to_ascii_lowercase();

        let domain = self.domains.is_empty()
            || self.domains.iter().any(|pattern| match pattern.strip_prefix("*.") {
                Some(suffix) => {
                    host.len() > suffix.len() + 1 && host.ends_with(&format!(".{suffix}"))
                }
                None => host == *pattern,
            });

        let resource = self.resources.is_empty()
            || self
                .resources
                .iter()
                .any(|prefix| object.path().starts_with(prefix.as_str()));

        let method = self.methods.is_empty() || self.methods.contains(object.method());

        domain && resource && method
    }
}

/// Rule-list policy matcher.
#[derive(Debug, Clone)]
pub struct StaticPolicy {
    default_policy: RequiredLevel,
    rules: Vec<AccessRule>,
}

impl StaticPolicy {
    pub fn new(default_policy: RequiredLevel, rules: Vec<AccessRule>) -> Self {
        Self {
            default_policy,
            rules,
        }
    }

    pub fn from_config(config: &AccessControlConfig) -> Result<Self, ConfigError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let methods = rule
                    .methods
                    .iter()
                    .map(|m| {
                        Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes()).map_err(|_| {
                            ConfigError::InvalidAccessRule {
                                index,
                                reason: format!("invalid method '{m}'"),
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let subjects = rule
                    .subjects
                    .iter()
                    .map(|s| {
                        SubjectMatcher::parse(s).ok_or_else(|| ConfigError::InvalidAccessRule {
                            index,
                            reason: format!("invalid subject '{s}', expected user:<name> or group:<name>"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let domains: Vec<&str> = rule.domains.iter().map(String::as_str).collect();
                let resources: Vec<&str> = rule.resources.iter().map(String::as_str).collect();

                Ok(AccessRule::new(rule.policy)
                    .with_domains(&domains)
                    .with_resources(&resources)
                    .with_methods(&methods)
                    .with_subjects(subjects))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        tracing::debug!(
            rules = rules.len(),
            default_policy = ?config.default_policy,
            "Loaded access control rules"
        );

        Ok(Self::new(config.default_policy, rules))
    }
}

#[async_trait]
impl PolicyMatcher for StaticPolicy {
    async fn required_level(
        &self,
        subject: Option<&Subject>,
        object: &Object,
    ) -> Result<PolicyMatch, ProviderError> {
        let mut has_subject = false;

        for rule in self.rules.iter().filter(|rule| rule.matches_object(object)) {
            if rule.subjects.is_empty() {
                return Ok(PolicyMatch {
                    level: rule.policy,
                    has_subject,
                });
            }

            match subject {
                Some(subject) if rule.subjects.iter().any(|m| m.matches(subject)) => {
                    return Ok(PolicyMatch {
                        level: rule.policy,
                        has_subject: true,
                    });
                }
                Some(_) => {}
                None => has_subject = true,
            }
        }

        Ok(PolicyMatch {
            level: self.default_policy,
            has_subject,
        })
    }
}
