use std::{env, sync::OnceLock};

pub const NATIVE_POLICY_ENV: &str = "REPLIX_NATIVE_EXTENSION";

/// How operations with a native implementation choose between it and the portable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativePolicy {
    /// Use the native extension when one is loaded, the portable path otherwise.
    #[default]
    Auto,
    /// The native extension must be used; its absence is an error.
    Require,
    /// Always use the portable path.
    Disable,
}

impl NativePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Require => "require",
            Self::Disable => "disable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Some(Self::Auto),
            "require" | "required" | "1" | "on" | "true" | "yes" => Some(Self::Require),
            "disable" | "disabled" | "0" | "off" | "false" | "no" => Some(Self::Disable),
            _ => None,
        }
    }
}

fn env_native_policy() -> NativePolicy {
    static ENV_POLICY: OnceLock<NativePolicy> = OnceLock::new();

    *ENV_POLICY.get_or_init(|| match env::var(NATIVE_POLICY_ENV) {
        Ok(value) => NativePolicy::parse(&value).unwrap_or_else(|| {
            log::warn!("ignoring unrecognised {}={:?}, using auto", NATIVE_POLICY_ENV, value);
            NativePolicy::Auto
        }),
        Err(_) => NativePolicy::Auto,
    })
}

thread_local! {
    static NATIVE_POLICY: std::cell::Cell<Option<NativePolicy>> = const { std::cell::Cell::new(None) };
}

pub fn get_native_policy() -> NativePolicy {
    NATIVE_POLICY.with(|p| p.get()).unwrap_or_else(env_native_policy)
}

pub fn set_native_policy(policy: NativePolicy) {
    NATIVE_POLICY.with(|p| p.set(Some(policy)));
}
