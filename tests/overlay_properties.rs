use proptest::prelude::*;
use skfix::overlay::overlay_profile;
use skfix::profiles::apply_profiles;
use skfix::schema::latest::{
    Artifact, BuildConfig, BuildType, ClusterDetails, Config, GoogleCloudBuild, LocalBuild,
    Profile, ShaTagger, TagPolicy,
};

fn build_type() -> impl Strategy<Value = BuildType> {
    prop_oneof![
        (proptest::option::of(any::<bool>()), any::<bool>()).prop_map(|(push, use_buildkit)| {
            BuildType::Local(LocalBuild {
                push,
                use_buildkit,
                ..Default::default()
            })
        }),
        "[a-z]{0,8}".prop_map(|project_id| BuildType::GoogleCloudBuild(GoogleCloudBuild {
            project_id,
            ..Default::default()
        })),
        ("[a-z]{0,8}", "[0-9]{0,2}m").prop_map(|(namespace, timeout)| {
            BuildType::Cluster(ClusterDetails {
                namespace,
                timeout,
                ..Default::default()
            })
        }),
    ]
}

fn artifacts() -> impl Strategy<Value = Vec<Artifact>> {
    proptest::collection::vec("[a-z]{1,8}", 0..4).prop_map(|images| {
        images
            .into_iter()
            .map(|image| Artifact {
                image,
                ..Default::default()
            })
            .collect()
    })
}

fn build() -> impl Strategy<Value = BuildConfig> {
    (artifacts(), proptest::option::of(build_type()), any::<bool>()).prop_map(
        |(artifacts, build_type, sha)| BuildConfig {
            artifacts,
            tag_policy: sha.then(|| TagPolicy::Sha256(ShaTagger {})),
            build_type,
            ..Default::default()
        },
    )
}

fn config(build: BuildConfig) -> Config {
    Config {
        api_version: "skaffold/v2alpha1".into(),
        kind: "Config".into(),
        build,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn empty_profile_is_identity(base in build()) {
        let base = config(base);
        prop_assert_eq!(overlay_profile(base.clone(), Profile::default()), base);
    }

    #[test]
    fn alternative_is_replaced_wholesale(base in build(), profile in build()) {
        let result = overlay_profile(
            config(base.clone()),
            Profile { build: profile.clone(), ..Default::default() },
        );
        let expected = profile.build_type.or(base.build_type);
        prop_assert_eq!(result.build.build_type, expected);
    }

    #[test]
    fn lists_are_replaced_when_populated(base in build(), profile in build()) {
        let result = overlay_profile(
            config(base.clone()),
            Profile { build: profile.clone(), ..Default::default() },
        );
        let expected = if profile.artifacts.is_empty() { base.artifacts } else { profile.artifacts };
        prop_assert_eq!(result.build.artifacts, expected);
    }

    #[test]
    fn applied_profile_has_at_most_one_build_type(base in build(), profile in build()) {
        let mut base = config(base);
        base.profiles = vec![Profile {
            name: "p".into(),
            build: profile,
            ..Default::default()
        }];
        let result = apply_profiles(&base, &["p".to_string()]).unwrap();

        let document = serde_yaml::to_value(&result).unwrap();
        let keys = ["local", "googleCloudBuild", "cluster"]
            .iter()
            .filter(|key| document["build"].get(**key).is_some())
            .count();
        prop_assert!(keys <= 1);

        let again: Config = serde_yaml::from_value(document).unwrap();
        prop_assert_eq!(again, result);
    }
}
