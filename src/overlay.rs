//! Merging a profile's partial pipeline onto the base pipeline.
//!
//! Populated profile values win. Lists and maps are replaced as a whole, and
//! a mutually exclusive group is swapped for the profile's alternative
//! without looking inside either side.

use std::collections::BTreeMap;

use crate::schema::latest::{
    ArtifactType, BuildConfig, BuildType, Config, DeployConfig, DeployType, KanikoBuildContext,
    Profile, Sync, TagPolicy,
};

pub trait Overlay {
    /// Returns `self` with every populated part of `profile` substituted in.
    fn overlay(self, profile: Self) -> Self;
}

impl Overlay for String {
    fn overlay(self, profile: Self) -> Self {
        if profile.is_empty() {
            self
        } else {
            profile
        }
    }
}

impl Overlay for bool {
    fn overlay(self, profile: Self) -> Self {
        self || profile
    }
}

macro_rules! impl_overlay_number {
    ($($ty:ty),*) => {
        $(
            impl Overlay for $ty {
                fn overlay(self, profile: Self) -> Self {
                    if profile == 0 {
                        self
                    } else {
                        profile
                    }
                }
            }
        )*
    };
}

impl_overlay_number!(u16, u32, i64);

impl<T> Overlay for Vec<T> {
    fn overlay(self, profile: Self) -> Self {
        if profile.is_empty() {
            self
        } else {
            profile
        }
    }
}

impl<K, V> Overlay for BTreeMap<K, V> {
    fn overlay(self, profile: Self) -> Self {
        if profile.is_empty() {
            self
        } else {
            profile
        }
    }
}

impl<T: Overlay> Overlay for Option<T> {
    fn overlay(self, profile: Self) -> Self {
        match (self, profile) {
            (Some(base), Some(profile)) => Some(base.overlay(profile)),
            (base, None) => base,
            (None, profile) => profile,
        }
    }
}

macro_rules! impl_overlay_one_of {
    ($($ty:ty),*) => {
        $(
            impl Overlay for $ty {
                fn overlay(self, profile: Self) -> Self {
                    profile
                }
            }
        )*
    };
}

impl_overlay_one_of!(TagPolicy, BuildType, ArtifactType, Sync, DeployType, KanikoBuildContext);

impl Overlay for BuildConfig {
    fn overlay(self, profile: Self) -> Self {
        let BuildConfig {
            artifacts,
            insecure_registries,
            tag_policy,
            build_type,
        } = profile;
        BuildConfig {
            artifacts: self.artifacts.overlay(artifacts),
            insecure_registries: self.insecure_registries.overlay(insecure_registries),
            tag_policy: self.tag_policy.overlay(tag_policy),
            build_type: self.build_type.overlay(build_type),
        }
    }
}

impl Overlay for DeployConfig {
    fn overlay(self, profile: Self) -> Self {
        let DeployConfig {
            deploy_type,
            status_check_deadline_seconds,
            kube_context,
        } = profile;
        DeployConfig {
            deploy_type: self.deploy_type.overlay(deploy_type),
            status_check_deadline_seconds: self
                .status_check_deadline_seconds
                .overlay(status_check_deadline_seconds),
            kube_context: self.kube_context.overlay(kube_context),
        }
    }
}

/// Overlays the pipeline sections of `profile` onto `config`. Name,
/// activation and patches of the profile are not part of the pipeline.
pub fn overlay_profile(config: Config, profile: Profile) -> Config {
    let Config {
        api_version,
        kind,
        metadata,
        build,
        test,
        deploy,
        port_forward,
        profiles,
    } = config;
    let Profile {
        build: profile_build,
        test: profile_test,
        deploy: profile_deploy,
        port_forward: profile_port_forward,
        ..
    } = profile;
    Config {
        api_version,
        kind,
        metadata,
        build: build.overlay(profile_build),
        test: test.overlay(profile_test),
        deploy: deploy.overlay(profile_deploy),
        port_forward: port_forward.overlay(profile_port_forward),
        profiles,
    }
}
