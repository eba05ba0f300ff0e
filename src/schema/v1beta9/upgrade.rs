use super::*;
use crate::schema::v1beta10 as next;
use crate::schema::{IntoNext, UpgradeError, Warning};

carry_over!(next =>
    TagPolicy { git_commit, sha256, env_template, date_time },
    GitTagger {},
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    ClusterDetails { pull_secret, pull_secret_name, namespace, timeout, docker_config },
    DockerConfig { path, secret_name },
    KanikoBuildContext { gcs_bucket, local_dir },
    LocalDir {},
    KanikoCache { repo },
    KanikoArtifact { flags, dockerfile, target, build_args, build_context, image, cache },
    DockerArtifact { dockerfile, target, build_args, cache_from },
    BazelArtifact { target, args },
    JibMavenArtifact { module, profile, args },
    JibGradleArtifact { project, args },
    TestCase { image, structure_tests },
    DeployConfig { helm, kubectl, kustomize },
    KubectlDeploy { manifests, remote_manifests, flags },
    KubectlFlags { global, apply, delete },
    HelmDeploy { releases, flags },
    HelmDeployFlags { global, install, upgrade },
    KustomizeDeploy { path, flags },
    HelmRelease {
        name, chart_path, values_files, values, namespace, version, set_values, set_value_templates,
        wait, recreate_pods, skip_build_dependencies, overrides, packaged, image_strategy
    },
    HelmPackaged { version, app_version },
    HelmImageStrategy { fqn, helm },
    HelmFqnConfig { property },
    HelmConventionConfig {},
    JsonPatch { op, path, from, value },
    Activation { env, kube_context, command },
);

impl IntoNext<next::LocalBuild> for LocalBuild {
    fn into_next(self) -> next::LocalBuild {
        let LocalBuild {
            skip_push,
            use_docker_cli,
            use_buildkit,
        } = self;
        next::LocalBuild {
            push: skip_push.map(|skip| !skip),
            use_docker_cli,
            use_buildkit,
        }
    }
}

impl Config {
    /// Inverts `skipPush` into `push` and rewrites sync maps into manual rules.
    ///
    /// Sync patterns that relied on directory flattening are converted as well
    /// as possible and reported through `warnings`.
    pub fn upgrade(self, warnings: &mut Vec<Warning>) -> Result<next::Config, UpgradeError> {
        let Config {
            api_version: _,
            kind,
            build,
            test,
            deploy,
            profiles,
        } = self;
        Ok(next::Config {
            api_version: next::VERSION.to_string(),
            kind,
            build: upgrade_build(build, None, warnings),
            test: test.into_next(),
            deploy: deploy.into_next(),
            profiles: profiles
                .into_iter()
                .map(|profile| upgrade_profile(profile, warnings))
                .collect(),
        })
    }
}

fn upgrade_profile(profile: Profile, warnings: &mut Vec<Warning>) -> next::Profile {
    let Profile {
        name,
        build,
        test,
        deploy,
        patches,
        activation,
    } = profile;
    next::Profile {
        build: upgrade_build(build, Some(&name), warnings),
        name,
        test: test.into_next(),
        deploy: deploy.into_next(),
        patches: patches.into_next(),
        activation: activation.into_next(),
    }
}

fn upgrade_build(
    build: BuildConfig,
    profile: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> next::BuildConfig {
    let BuildConfig {
        artifacts,
        tag_policy,
        local,
        google_cloud_build,
        cluster,
    } = build;
    next::BuildConfig {
        artifacts: artifacts
            .into_iter()
            .map(|artifact| upgrade_artifact(artifact, profile, warnings))
            .collect(),
        tag_policy: tag_policy.into_next(),
        local: local.into_next(),
        google_cloud_build: google_cloud_build.into_next(),
        cluster: cluster.into_next(),
    }
}

fn upgrade_artifact(
    artifact: Artifact,
    profile: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> next::Artifact {
    let Artifact {
        image,
        context,
        sync,
        docker,
        bazel,
        jib_maven,
        jib_gradle,
        kaniko,
    } = artifact;

    let sync = if sync.is_empty() {
        None
    } else {
        let manual = sync
            .into_iter()
            .map(|(pattern, dest)| {
                let (rule, compatible) = sync_rule(&pattern, &dest);
                if !compatible {
                    warnings.push(Warning::IncompatibleSyncPattern {
                        image: image.clone(),
                        profile: profile.map(str::to_string),
                        pattern,
                        dest,
                    });
                }
                rule
            })
            .collect();
        Some(next::Sync { manual })
    };

    next::Artifact {
        image,
        context,
        sync,
        docker: docker.into_next(),
        bazel: bazel.into_next(),
        jib_maven: jib_maven.into_next(),
        jib_gradle: jib_gradle.into_next(),
        kaniko: kaniko.into_next(),
    }
}

/// Converts one `pattern: dest` entry. The flag is false when the old pattern
/// flattened directories in a way manual rules can't express.
fn sync_rule(pattern: &str, dest: &str) -> (next::SyncRule, bool) {
    let rule = |src: String, strip: &str| next::SyncRule {
        src,
        dest: dest.to_string(),
        strip: strip.to_string(),
    };

    // "***" kept the directory structure below it.
    if let Some(index) = pattern.find("***") {
        let compatible = !pattern[..index].contains('*') && !pattern[index + 3..].contains("**");
        let src = pattern.replacen("***", "**", 1);
        return (rule(src, static_prefix(pattern)), compatible);
    }

    let (rest, anywhere) = match pattern.strip_prefix("**/") {
        Some(rest) => (rest, true),
        None => (pattern, false),
    };
    let (dir, base) = match rest.rfind('/') {
        Some(i) => (&rest[..=i], &rest[i + 1..]),
        None => ("", rest),
    };
    if !dir.contains('*') && base.matches('*').count() <= 1 {
        let strip = if anywhere { "" } else { dir };
        return (rule(pattern.to_string(), strip), true);
    }

    (rule(pattern.to_string(), static_prefix(pattern)), false)
}

/// Directory part of `pattern` in front of its first wildcard.
fn static_prefix(pattern: &str) -> &str {
    let end = pattern.find('*').unwrap_or(pattern.len());
    match pattern[..end].rfind('/') {
        Some(i) => &pattern[..=i],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upgrade(doc: &str) -> (next::Config, Vec<Warning>) {
        let config: Config = serde_yaml::from_str(doc).unwrap();
        let mut warnings = vec![];
        let upgraded = config.upgrade(&mut warnings).unwrap();
        (upgraded, warnings)
    }

    #[test]
    fn skip_push_is_inverted_per_profile() {
        let doc = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  local:
    skipPush: false
profiles:
- name: testEnv1
  build:
    local:
      skipPush: true
- name: testEnv2
  build:
    local:
      useBuildkit: true
"#;
        let expected = r#"
apiVersion: skaffold/v1beta10
kind: Config
build:
  local:
    push: true
profiles:
- name: testEnv1
  build:
    local:
      push: false
- name: testEnv2
  build:
    local:
      useBuildkit: true
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        let (upgraded, warnings) = upgrade(doc);
        assert_eq!(upgraded, expected);
        assert_eq!(upgraded.profiles[1].build.local.as_ref().unwrap().push, None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn sync_map_becomes_manual_rules() {
        let doc = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  artifacts:
  - image: gcr.io/k8s-skaffold/node-example
    context: node
    sync:
      "*.js": .
      "/public/b/*.js": /app
      "**/*.html": static
      "src/***/*.css": /styles
"#;
        let expected = r#"
apiVersion: skaffold/v1beta10
kind: Config
build:
  artifacts:
  - image: gcr.io/k8s-skaffold/node-example
    context: node
    sync:
      manual:
      - src: "**/*.html"
        dest: static
      - src: "*.js"
        dest: .
      - src: "/public/b/*.js"
        dest: /app
        strip: /public/b/
      - src: "src/**/*.css"
        dest: /styles
        strip: src/
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        let (upgraded, warnings) = upgrade(doc);
        assert_eq!(upgraded, expected);
        assert!(warnings.is_empty());
    }

    #[test]
    fn incompatible_sync_pattern_warns() {
        let doc = r#"
profiles:
- name: dev
  build:
    artifacts:
    - image: app
      sync:
        "src/**/nested/*.js": /app
        "lib/*.js": /app/lib
"#;
        let (upgraded, warnings) = upgrade(doc);
        assert_eq!(
            warnings,
            vec![Warning::IncompatibleSyncPattern {
                image: "app".into(),
                profile: Some("dev".into()),
                pattern: "src/**/nested/*.js".into(),
                dest: "/app".into(),
            }]
        );
        let manual = &upgraded.profiles[0].build.artifacts[0]
            .sync
            .as_ref()
            .unwrap()
            .manual;
        assert_eq!(
            manual,
            &vec![
                next::SyncRule {
                    src: "lib/*.js".into(),
                    dest: "/app/lib".into(),
                    strip: "lib/".into(),
                },
                next::SyncRule {
                    src: "src/**/nested/*.js".into(),
                    dest: "/app".into(),
                    strip: "src/".into(),
                },
            ]
        );
    }

    #[test]
    fn pattern_classification() {
        let cases = [
            ("app.js", "", true),
            ("a/b/c.txt", "a/b/", true),
            ("*.js", "", true),
            ("/public/b/*.js", "/public/b/", true),
            ("**/*.js", "", true),
            ("a/***", "a/", true),
            ("a/*.min.*", "a/", false),
            ("*/b/*.js", "", false),
            ("a/**/b/*.js", "a/", false),
            ("*/***", "", false),
        ];
        for (pattern, strip, compatible) in cases {
            let (rule, ok) = sync_rule(pattern, "/dest");
            assert_eq!((rule.strip.as_str(), ok), (strip, compatible), "{pattern}");
            assert_eq!(rule.dest, "/dest");
        }
    }

    #[test]
    fn cluster_builds_and_profile_settings_are_kept() {
        let doc = r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  artifacts:
  - image: app
    kaniko:
      dockerfile: Dockerfile.prod
      buildContext:
        gcsBucket: my-bucket
  cluster:
    namespace: builds
profiles:
- name: ci
  activation:
  - env: CI=true
  patches:
  - path: /build/cluster/namespace
    value: ci
"#;
        let (upgraded, warnings) = upgrade(doc);
        let expected: next::Config =
            serde_yaml::from_str(&doc.replace("v1beta9", "v1beta10")).unwrap();
        assert_eq!(upgraded, expected);
        assert!(warnings.is_empty());
    }

    #[test]
    fn empty_sync_map_stays_unset() {
        let (upgraded, _) = upgrade("build:\n  artifacts:\n  - image: app\n    sync: {}\n");
        assert_eq!(upgraded.build.artifacts[0].sync, None);
    }
}
