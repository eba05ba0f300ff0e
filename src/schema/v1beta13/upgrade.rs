use super::*;
use crate::schema::latest as next;
use crate::schema::{IntoNext, OneOfError, UpgradeError, Warning};

carry_over!(next =>
    Metadata { name },
    PortForwardResource { resource_type, resource_name, namespace, port, local_port },
    GitTagger { variant },
    ShaTagger {},
    EnvTemplateTagger { template },
    DateTimeTagger { format, timezone },
    LocalBuild { push, use_docker_cli, use_buildkit },
    GoogleCloudBuild { project_id, disk_size_gb, machine_type, timeout, docker_image, maven_image, gradle_image },
    ClusterDetails {
        http_proxy, https_proxy, pull_secret, pull_secret_name, namespace, timeout, docker_config,
        resources
    },
    DockerConfig { path, secret_name },
    ResourceRequirements { requests, limits },
    ResourceRequirement { cpu, memory },
    LocalDir { init_image },
    KanikoCache { repo, host_path },
    SyncRule { src, dest, strip },
    DockerArtifact { dockerfile, target, build_args, network, cache_from, no_cache },
    BazelArtifact { target, args },
    CustomArtifact { build_command, dependencies },
    CustomDependencies { dockerfile, command, paths, ignore },
    DockerfileDependency { path, build_args },
    TestCase { image, structure_tests },
    HelmDeployFlags { global, install, upgrade },
    HelmPackaged { version, app_version },
    HelmFqnConfig { property },
    HelmConventionConfig { explicit_registry },
    KubectlDeploy { manifests, remote_manifests, flags },
    KubectlFlags { global, apply, delete },
    Activation { env, kube_context, command },
    JsonPatch { op, path, from, value },
);

const MAVEN: &str = "maven";
const GRADLE: &str = "gradle";

impl IntoNext<next::JibArtifact> for JibMavenArtifact {
    fn into_next(self) -> next::JibArtifact {
        let JibMavenArtifact {
            module,
            profile,
            args,
        } = self;
        let mut merged = Vec::with_capacity(args.len() + 2);
        if !profile.is_empty() {
            merged.push("--activate-profiles".to_string());
            merged.push(profile);
        }
        merged.extend(args);
        next::JibArtifact {
            project: module,
            args: merged,
            plugin_type: MAVEN.to_string(),
        }
    }
}

impl IntoNext<next::JibArtifact> for JibGradleArtifact {
    fn into_next(self) -> next::JibArtifact {
        let JibGradleArtifact { project, args } = self;
        next::JibArtifact {
            project,
            args,
            plugin_type: GRADLE.to_string(),
        }
    }
}

impl IntoNext<next::KustomizeDeploy> for KustomizeDeploy {
    fn into_next(self) -> next::KustomizeDeploy {
        let KustomizeDeploy { path, flags } = self;
        next::KustomizeDeploy {
            paths: if path.is_empty() { vec![] } else { vec![path] },
            flags: flags.into_next(),
        }
    }
}

impl Config {
    /// Re-expresses every mutually exclusive group as a sum type, folds
    /// `jibMaven` and `jibGradle` into `jib` and lets kustomize take a list
    /// of paths.
    pub fn upgrade(self, _warnings: &mut Vec<Warning>) -> Result<next::Config, UpgradeError> {
        let Config {
            api_version: _,
            kind,
            metadata,
            build,
            test,
            deploy,
            port_forward,
            profiles,
        } = self;
        Ok(next::Config {
            api_version: next::VERSION.to_string(),
            kind,
            metadata: metadata.into_next(),
            build: upgrade_build(build)?,
            test: test.into_next(),
            deploy: upgrade_deploy(deploy)?,
            port_forward: port_forward.into_next(),
            profiles: profiles
                .into_iter()
                .map(upgrade_profile)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn upgrade_profile(profile: Profile) -> Result<next::Profile, UpgradeError> {
    let Profile {
        name,
        build,
        test,
        deploy,
        port_forward,
        patches,
        activation,
    } = profile;
    Ok(next::Profile {
        name,
        activation: activation.into_next(),
        patches: patches.into_next(),
        build: upgrade_build(build)?,
        test: test.into_next(),
        deploy: upgrade_deploy(deploy)?,
        port_forward: port_forward.into_next(),
    })
}

fn upgrade_build(build: BuildConfig) -> Result<next::BuildConfig, UpgradeError> {
    let BuildConfig {
        artifacts,
        insecure_registries,
        tag_policy,
        local,
        google_cloud_build,
        cluster,
    } = build;

    let TagPolicy {
        git_commit,
        sha256,
        env_template,
        date_time,
    } = tag_policy;
    let tag_policy = next::TagPolicy::from_slots(next::TagPolicySlots {
        git_commit: git_commit.into_next(),
        sha256: sha256.into_next(),
        env_template: env_template.into_next(),
        date_time: date_time.into_next(),
    })?;
    let build_type = next::BuildType::from_slots(next::BuildTypeSlots {
        local: local.into_next(),
        google_cloud_build: google_cloud_build.into_next(),
        cluster: cluster.into_next(),
    })?;

    Ok(next::BuildConfig {
        artifacts: artifacts
            .into_iter()
            .map(upgrade_artifact)
            .collect::<Result<_, _>>()?,
        insecure_registries,
        tag_policy,
        build_type,
    })
}

fn upgrade_artifact(artifact: Artifact) -> Result<next::Artifact, UpgradeError> {
    let Artifact {
        image,
        context,
        sync,
        docker,
        bazel,
        jib_maven,
        jib_gradle,
        kaniko,
        custom,
    } = artifact;
    let jib = match (jib_maven, jib_gradle) {
        (Some(_), Some(_)) => {
            return Err(OneOfError {
                group: "JibArtifact",
                choices: &["jibMaven", "jibGradle"],
                found: vec!["jibMaven", "jibGradle"],
            }
            .into())
        }
        (Some(maven), None) => Some(maven.into_next()),
        (None, Some(gradle)) => Some(gradle.into_next()),
        (None, None) => None,
    };
    let kaniko = kaniko.map(upgrade_kaniko).transpose()?;
    let sync = match sync {
        Some(Sync { manual, infer }) => next::Sync::from_slots(next::SyncSlots {
            manual: (!manual.is_empty()).then(|| manual.into_next()),
            infer: (!infer.is_empty()).then_some(infer),
            auto: None,
        })?,
        None => None,
    };
    Ok(next::Artifact {
        image,
        context,
        sync,
        artifact_type: next::ArtifactType::from_slots(next::ArtifactTypeSlots {
            docker: docker.into_next(),
            bazel: bazel.into_next(),
            jib,
            kaniko,
            buildpacks: None,
            custom: custom.into_next(),
        })?,
        requires: vec![],
    })
}

fn upgrade_kaniko(kaniko: KanikoArtifact) -> Result<next::KanikoArtifact, UpgradeError> {
    let KanikoArtifact {
        flags,
        dockerfile,
        target,
        build_args,
        build_context,
        image,
        cache,
        reproducible,
    } = kaniko;
    let build_context = match build_context {
        Some(KanikoBuildContext {
            gcs_bucket,
            local_dir,
        }) => next::KanikoBuildContext::from_slots(next::KanikoBuildContextSlots {
            gcs_bucket,
            local_dir: local_dir.into_next(),
        })?,
        None => None,
    };
    Ok(next::KanikoArtifact {
        dockerfile,
        target,
        build_args,
        flags,
        image,
        cache: cache.into_next(),
        build_context,
        reproducible,
    })
}

fn upgrade_deploy(deploy: DeployConfig) -> Result<next::DeployConfig, UpgradeError> {
    let DeployConfig {
        status_check_deadline_seconds,
        helm,
        kubectl,
        kustomize,
    } = deploy;
    Ok(next::DeployConfig {
        deploy_type: next::DeployType::from_slots(next::DeployTypeSlots {
            helm: helm.map(upgrade_helm).transpose()?,
            kubectl: kubectl.into_next(),
            kustomize: kustomize.into_next(),
            kpt: None,
        })?,
        status_check_deadline_seconds,
        kube_context: String::new(),
    })
}

fn upgrade_helm(helm: HelmDeploy) -> Result<next::HelmDeploy, UpgradeError> {
    let HelmDeploy { releases, flags } = helm;
    Ok(next::HelmDeploy {
        releases: releases
            .into_iter()
            .map(upgrade_release)
            .collect::<Result<_, _>>()?,
        flags: flags.into_next(),
    })
}

fn upgrade_release(release: HelmRelease) -> Result<next::HelmRelease, UpgradeError> {
    let HelmRelease {
        name,
        chart_path,
        values_files,
        values,
        namespace,
        version,
        set_values,
        set_value_templates,
        wait,
        recreate_pods,
        skip_build_dependencies,
        use_helm_secrets,
        remote,
        overrides,
        packaged,
        image_strategy: HelmImageStrategy { fqn, helm },
    } = release;
    Ok(next::HelmRelease {
        name,
        chart_path,
        values_files,
        values,
        namespace,
        version,
        set_values,
        set_value_templates,
        wait,
        recreate_pods,
        skip_build_dependencies,
        use_helm_secrets,
        remote,
        overrides,
        packaged: packaged.into_next(),
        image_strategy: next::HelmImageStrategy::from_slots(next::HelmImageStrategySlots {
            fqn: fqn.into_next(),
            helm: helm.into_next(),
        })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upgrade(doc: &str) -> Result<next::Config, UpgradeError> {
        let config: Config = serde_yaml::from_str(doc).unwrap();
        config.upgrade(&mut vec![])
    }

    #[test]
    fn upgrade_to_latest() {
        let doc = r#"
apiVersion: skaffold/v1beta13
kind: Config
metadata:
  name: example
build:
  insecureRegistries: [localhost:5000]
  tagPolicy:
    dateTime:
      format: "2006-01-02"
  artifacts:
  - image: gcr.io/k8s-skaffold/skaffold-example
    sync:
      manual:
      - src: "*.go"
        dest: /app
  - image: gcr.io/k8s-skaffold/kaniko
    kaniko:
      buildContext:
        localDir:
          initImage: busybox
      cache:
        hostPath: /cache
      reproducible: true
  cluster:
    HTTP_PROXY: http://proxy:3128
    resources:
      limits:
        cpu: "2"
        memory: 2Gi
test:
- image: gcr.io/k8s-skaffold/skaffold-example
  structureTests: [./test/*]
deploy:
  statusCheckDeadlineSeconds: 90
  helm:
    flags:
      upgrade: [--force]
    releases:
    - name: skaffold
      chartPath: charts/skaffold
      useHelmSecrets: true
      overrides:
        replicas: 2
      imageStrategy:
        helm:
          explicitRegistry: true
portForward:
- resourceType: deployment
  resourceName: leeroy-web
  port: 8080
  localPort: 9000
profiles:
- name: dev
  activation:
  - env: ENV=dev
  - kubeContext: minikube
    command: dev
  patches:
  - op: replace
    path: /build/artifacts/0/image
    value: dev-image
  deploy:
    kustomize:
      path: overlays/dev
"#;
        let expected = r#"
apiVersion: skaffold/v2alpha1
kind: Config
metadata:
  name: example
build:
  insecureRegistries: [localhost:5000]
  tagPolicy:
    dateTime:
      format: "2006-01-02"
  artifacts:
  - image: gcr.io/k8s-skaffold/skaffold-example
    sync:
      manual:
      - src: "*.go"
        dest: /app
  - image: gcr.io/k8s-skaffold/kaniko
    kaniko:
      buildContext:
        localDir:
          initImage: busybox
      cache:
        hostPath: /cache
      reproducible: true
  cluster:
    HTTP_PROXY: http://proxy:3128
    resources:
      limits:
        cpu: "2"
        memory: 2Gi
test:
- image: gcr.io/k8s-skaffold/skaffold-example
  structureTests: [./test/*]
deploy:
  statusCheckDeadlineSeconds: 90
  helm:
    flags:
      upgrade: [--force]
    releases:
    - name: skaffold
      chartPath: charts/skaffold
      useHelmSecrets: true
      overrides:
        replicas: 2
      imageStrategy:
        helm:
          explicitRegistry: true
portForward:
- resourceType: deployment
  resourceName: leeroy-web
  port: 8080
  localPort: 9000
profiles:
- name: dev
  activation:
  - env: ENV=dev
  - kubeContext: minikube
    command: dev
  patches:
  - op: replace
    path: /build/artifacts/0/image
    value: dev-image
  deploy:
    kustomize:
      paths: [overlays/dev]
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        assert_eq!(upgrade(doc).unwrap(), expected);
    }

    #[test]
    fn jib_builders_are_merged() {
        let doc = r#"
build:
  artifacts:
  - image: gcr.io/k8s-skaffold/jib-maven
    jibMaven:
      module: server
      profile: prod
      args: [-DskipTests]
  - image: gcr.io/k8s-skaffold/jib-gradle
    jibGradle:
      project: app
profiles:
- name: dev
  build:
    artifacts:
    - image: gcr.io/k8s-skaffold/jib-maven
      jibMaven: {}
"#;
        let expected = r#"
apiVersion: skaffold/v2alpha1
build:
  artifacts:
  - image: gcr.io/k8s-skaffold/jib-maven
    jib:
      project: server
      args: [--activate-profiles, prod, -DskipTests]
      type: maven
  - image: gcr.io/k8s-skaffold/jib-gradle
    jib:
      project: app
      type: gradle
profiles:
- name: dev
  build:
    artifacts:
    - image: gcr.io/k8s-skaffold/jib-maven
      jib:
        type: maven
"#;
        let expected: next::Config = serde_yaml::from_str(expected).unwrap();
        assert_eq!(upgrade(doc).unwrap(), expected);
    }

    #[test]
    fn empty_kustomize_path_means_no_paths() {
        let upgraded = upgrade("deploy:\n  kustomize:\n    flags:\n      apply: [--prune]\n").unwrap();
        match upgraded.deploy.deploy_type {
            Some(next::DeployType::Kustomize(kustomize)) => {
                assert!(kustomize.paths.is_empty());
                assert_eq!(kustomize.flags.apply, vec!["--prune"]);
            }
            other => panic!("unexpected deploy type {other:?}"),
        }
    }

    #[test]
    fn ambiguous_groups_fail() {
        let cases = [
            ("build:\n  local: {}\n  cluster: {}\n", "BuildType"),
            ("build:\n  tagPolicy:\n    gitCommit: {}\n    sha256: {}\n", "TagPolicy"),
            (
                "build:\n  artifacts:\n  - image: a\n    docker: {}\n    jibMaven: {}\n",
                "ArtifactType",
            ),
            (
                "build:\n  artifacts:\n  - image: a\n    jibMaven: {}\n    jibGradle: {}\n",
                "JibArtifact",
            ),
            (
                "build:\n  artifacts:\n  - image: a\n    sync:\n      manual: [{src: a, dest: b}]\n      infer: [c]\n",
                "Sync",
            ),
            ("deploy:\n  helm: {}\n  kubectl: {}\n", "DeployType"),
            (
                "build:\n  artifacts:\n  - image: a\n    kaniko:\n      buildContext:\n        gcsBucket: b\n        localDir: {}\n",
                "KanikoBuildContext",
            ),
            (
                "deploy:\n  helm:\n    releases:\n    - name: a\n      imageStrategy:\n        fqn: {}\n        helm: {}\n",
                "HelmImageStrategy",
            ),
        ];
        for (doc, group) in cases {
            match upgrade(doc) {
                Err(UpgradeError::OneOf(err)) => assert_eq!(err.group, group, "{doc}"),
                other => panic!("{doc}: unexpected result {other:?}"),
            }
        }
    }
}
