//! Profile selection and application.

use std::collections::BTreeMap;

use log::debug;
use regex::Regex;
use thiserror::Error;

use crate::overlay::overlay_profile;
use crate::patch;
use crate::schema::latest::{Activation, Config, Profile};

#[derive(Error, Debug)]
pub enum Error {
    #[error("couldn't find profile {}", .0.join(", "))]
    NotFound(Vec<String>),
    #[error("profile {profile}: invalid env activation {expression:?}, expected KEY=VALUE")]
    EnvActivation { profile: String, expression: String },
    #[error("profile {profile}: invalid activation pattern: {source}")]
    Pattern {
        profile: String,
        source: regex::Error,
    },
    #[error("profile {profile}: {source}")]
    Patch {
        profile: String,
        source: patch::Error,
    },
}

/// What automatic activation is matched against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationContext {
    pub env: BTreeMap<String, String>,
    pub kube_context: Option<String>,
    /// The command being run, such as `dev` or `run`.
    pub command: Option<String>,
}

impl ActivationContext {
    /// Captures the current process environment.
    pub fn from_env(kube_context: Option<String>, command: Option<String>) -> Self {
        Self {
            env: std::env::vars().collect(),
            kube_context,
            command,
        }
    }
}

/// Applies the named profiles to a copy of `config`, in order.
///
/// Every name is checked before anything is applied. With no names the copy
/// is returned unchanged; otherwise the result has no profiles left.
pub fn apply_profiles(config: &Config, names: &[String]) -> Result<Config, Error> {
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !config.profiles.iter().any(|p| &p.name == *name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotFound(missing));
    }
    if names.is_empty() {
        return Ok(config.clone());
    }

    let mut result = config.clone();
    result.profiles = vec![];
    for name in names {
        let profile = config
            .profiles
            .iter()
            .find(|p| &p.name == name)
            .cloned()
            .ok_or_else(|| Error::NotFound(vec![name.clone()]))?;
        debug!("applying profile {}", name);
        result = apply_profile(result, profile)?;
    }
    Ok(result)
}

fn apply_profile(config: Config, profile: Profile) -> Result<Config, Error> {
    let name = profile.name.clone();
    let patches = profile.patches.clone();
    let overlaid = overlay_profile(config, profile);
    patch::apply(overlaid, &patches).map_err(|source| Error::Patch {
        profile: name,
        source,
    })
}

/// Resolves which profiles to apply, in application order.
///
/// Requested names come first, as given. Profiles whose activation matches
/// `context` follow in declaration order. A requested name prefixed with `-`
/// keeps that profile from activating automatically.
pub fn activated_profiles(
    config: &Config,
    requested: &[String],
    context: &ActivationContext,
) -> Result<Vec<String>, Error> {
    let mut explicit: Vec<String> = vec![];
    let mut disabled: Vec<&str> = vec![];
    for name in requested {
        match name.strip_prefix('-') {
            Some(name) => disabled.push(name),
            None if !explicit.contains(name) => explicit.push(name.clone()),
            None => {}
        }
    }

    let missing: Vec<String> = explicit
        .iter()
        .map(String::as_str)
        .chain(disabled.iter().copied())
        .filter(|name| !config.profiles.iter().any(|p| p.name == *name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotFound(missing));
    }

    let mut activated = explicit;
    for profile in &config.profiles {
        if activated.contains(&profile.name) || disabled.contains(&profile.name.as_str()) {
            continue;
        }
        if is_activated(profile, context)? {
            debug!("profile {} activated automatically", profile.name);
            activated.push(profile.name.clone());
        }
    }
    Ok(activated)
}

fn is_activated(profile: &Profile, context: &ActivationContext) -> Result<bool, Error> {
    for activation in &profile.activation {
        if activation_matches(profile, activation, context)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// An entry with no criteria never matches.
fn activation_matches(
    profile: &Profile,
    activation: &Activation,
    context: &ActivationContext,
) -> Result<bool, Error> {
    let Activation {
        env,
        kube_context,
        command,
    } = activation;
    if env.is_empty() && kube_context.is_empty() && command.is_empty() {
        return Ok(false);
    }

    if !env.is_empty() {
        let (key, expected) = env.split_once('=').ok_or_else(|| Error::EnvActivation {
            profile: profile.name.clone(),
            expression: env.clone(),
        })?;
        let value = context.env.get(key).map(String::as_str).unwrap_or_default();
        // An empty expectation means the variable is unset or empty.
        let matched = if expected.is_empty() {
            value.is_empty()
        } else {
            satisfies(profile, expected, value)?
        };
        if !matched {
            return Ok(false);
        }
    }
    if !kube_context.is_empty() {
        let current = context.kube_context.as_deref().unwrap_or_default();
        if !satisfies(profile, kube_context, current)? {
            return Ok(false);
        }
    }
    if !command.is_empty() {
        let current = context.command.as_deref().unwrap_or_default();
        if !satisfies(profile, command, current)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// `expected` is a regex searched for in `actual`, or an exact value. A
/// leading `!` negates the match.
fn satisfies(profile: &Profile, expected: &str, actual: &str) -> Result<bool, Error> {
    match expected.strip_prefix('!') {
        Some(negated) => Ok(!matches(profile, negated, actual)?),
        None => matches(profile, expected, actual),
    }
}

fn matches(profile: &Profile, expected: &str, actual: &str) -> Result<bool, Error> {
    if expected == actual {
        return Ok(true);
    }
    let regex = Regex::new(expected).map_err(|source| Error::Pattern {
        profile: profile.name.clone(),
        source,
    })?;
    Ok(regex.is_match(actual))
}
