//! `skaffold/v1beta11` document shape.

use std::collections::BTreeMap;

use serde::Deserialize;

mod upgrade;

/// Released. Never change this shape; add a new version instead.
pub const VERSION: &str = "skaffold/v1beta11";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    pub api_version: String,
    pub kind: String,
    pub build: BuildConfig,
    pub test: Vec<TestCase>,
    pub deploy: DeployConfig,
    pub profiles: Vec<Profile>,
}

/// Artifacts to build and how to build them. `local`, `googleCloudBuild` and
/// `cluster` are mutually exclusive.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BuildConfig {
    pub artifacts: Vec<Artifact>,
    pub tag_policy: TagPolicy,
    pub local: Option<LocalBuild>,
    pub google_cloud_build: Option<GoogleCloudBuild>,
    pub cluster: Option<ClusterDetails>,
}

/// At most one tagger may be set.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TagPolicy {
    pub git_commit: Option<GitTagger>,
    pub sha256: Option<ShaTagger>,
    pub env_template: Option<EnvTemplateTagger>,
    pub date_time: Option<DateTimeTagger>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitTagger {
    /// `Tags`, `CommitSha`, `AbbrevCommitSha`, `TreeSha` or `AbbrevTreeSha`.
    pub variant: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShaTagger {}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvTemplateTagger {
    pub template: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DateTimeTagger {
    pub format: String,
    pub timezone: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct LocalBuild {
    /// Unset means "decide from the kube context".
    pub push: Option<bool>,
    #[serde(rename = "useDockerCLI")]
    pub use_docker_cli: bool,
    pub use_buildkit: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GoogleCloudBuild {
    pub project_id: String,
    pub disk_size_gb: i64,
    pub machine_type: String,
    pub timeout: String,
    pub docker_image: String,
    pub maven_image: String,
    pub gradle_image: String,
}

/// Either `gcsBucket` or `localDir`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KanikoBuildContext {
    pub gcs_bucket: Option<String>,
    pub local_dir: Option<LocalDir>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LocalDir {}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KanikoCache {
    pub repo: String,
}

/// Builds run as pods in the current cluster.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ClusterDetails {
    pub pull_secret: String,
    pub pull_secret_name: String,
    pub namespace: String,
    pub timeout: String,
    pub docker_config: Option<DockerConfig>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerConfig {
    pub path: String,
    pub secret_name: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TestCase {
    pub image: String,
    pub structure_tests: Vec<String>,
}

/// `helm`, `kubectl` and `kustomize` are mutually exclusive.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub helm: Option<HelmDeploy>,
    pub kubectl: Option<KubectlDeploy>,
    pub kustomize: Option<KustomizeDeploy>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KubectlDeploy {
    pub manifests: Vec<String>,
    pub remote_manifests: Vec<String>,
    pub flags: KubectlFlags,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KubectlFlags {
    pub global: Vec<String>,
    pub apply: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmDeploy {
    pub releases: Vec<HelmRelease>,
    pub flags: HelmDeployFlags,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmDeployFlags {
    pub global: Vec<String>,
    pub install: Vec<String>,
    pub upgrade: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KustomizeDeploy {
    pub path: String,
    pub flags: KubectlFlags,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HelmRelease {
    pub name: String,
    pub chart_path: String,
    pub values_files: Vec<String>,
    pub values: BTreeMap<String, String>,
    pub namespace: String,
    pub version: String,
    pub set_values: BTreeMap<String, String>,
    pub set_value_templates: BTreeMap<String, String>,
    pub wait: bool,
    pub recreate_pods: bool,
    pub skip_build_dependencies: bool,
    pub overrides: BTreeMap<String, serde_yaml::Value>,
    pub packaged: Option<HelmPackaged>,
    pub image_strategy: HelmImageStrategy,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HelmPackaged {
    pub version: String,
    pub app_version: String,
}

/// Either `fqn` or `helm`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmImageStrategy {
    pub fqn: Option<HelmFqnConfig>,
    pub helm: Option<HelmConventionConfig>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmFqnConfig {
    pub property: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmConventionConfig {}

/// An image to build. At most one of the builder fields may be set.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Artifact {
    pub image: String,
    pub context: String,
    pub sync: Option<Sync>,
    pub docker: Option<DockerArtifact>,
    pub bazel: Option<BazelArtifact>,
    pub jib_maven: Option<JibMavenArtifact>,
    pub jib_gradle: Option<JibGradleArtifact>,
    pub kaniko: Option<KanikoArtifact>,
    pub custom: Option<CustomArtifact>,
}

/// Either `manual` or `infer`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Sync {
    pub manual: Vec<SyncRule>,
    pub infer: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncRule {
    pub src: String,
    pub dest: String,
    pub strip: String,
}

/// Named overrides of the pipeline sections.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub name: String,
    pub build: BuildConfig,
    pub test: Vec<TestCase>,
    pub deploy: DeployConfig,
    pub patches: Vec<JsonPatch>,
    pub activation: Vec<Activation>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JsonPatch {
    pub op: String,
    pub path: String,
    pub from: String,
    pub value: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Activation {
    pub env: String,
    pub kube_context: String,
    pub command: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerArtifact {
    pub dockerfile: String,
    pub target: String,
    pub build_args: BTreeMap<String, Option<String>>,
    pub network: String,
    pub cache_from: Vec<String>,
    pub no_cache: bool,
}

/// A Dockerfile built by the kaniko executor inside the cluster.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KanikoArtifact {
    pub flags: Vec<String>,
    pub dockerfile: String,
    pub target: String,
    pub build_args: BTreeMap<String, Option<String>>,
    pub build_context: Option<KanikoBuildContext>,
    pub image: String,
    pub cache: Option<KanikoCache>,
    pub reproducible: bool,
}

/// Images built by a user-supplied script.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CustomArtifact {
    pub build_command: String,
    pub dependencies: Option<CustomDependencies>,
}

/// Files that trigger a rebuild: a Dockerfile, a command listing them, or
/// glob paths.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CustomDependencies {
    pub dockerfile: Option<DockerfileDependency>,
    pub command: String,
    pub paths: Vec<String>,
    pub ignore: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerfileDependency {
    pub path: String,
    pub build_args: BTreeMap<String, Option<String>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BazelArtifact {
    pub target: String,
    pub args: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JibMavenArtifact {
    pub module: String,
    pub profile: String,
    pub args: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JibGradleArtifact {
    pub project: String,
    pub args: Vec<String>,
}
