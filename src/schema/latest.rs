//! The latest configuration shape, `skaffold/v2alpha1`.
//!
//! Mutually exclusive alternatives are enums here. In a document they are
//! still sibling keys; each group is decoded through a slots struct that
//! rejects unknown keys and fails when two alternatives are populated, so a
//! decoded value can never hold more than one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::OneOfError;

pub const VERSION: &str = "skaffold/v2alpha1";

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    pub api_version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "is_default")]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "is_default")]
    pub build: BuildConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<TestCase>,
    #[serde(skip_serializing_if = "is_default")]
    pub deploy: DeployConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_forward: Vec<PortForwardResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<Profile>,
}

impl Config {
    /// Already the latest version.
    pub fn upgrade(self) -> Self {
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Metadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Artifacts to build, how to tag them and where to build them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "RawBuildConfig", into = "RawBuildConfig")]
pub struct BuildConfig {
    pub artifacts: Vec<Artifact>,
    /// Registries reached over plain HTTP or with self-signed certificates.
    pub insecure_registries: Vec<String>,
    pub tag_policy: Option<TagPolicy>,
    pub build_type: Option<BuildType>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
struct RawBuildConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    insecure_registries: Vec<String>,
    #[serde(
        deserialize_with = "TagPolicy::deserialize_slot",
        serialize_with = "TagPolicy::serialize_slot",
        skip_serializing_if = "Option::is_none"
    )]
    tag_policy: Option<TagPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local: Option<LocalBuild>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_cloud_build: Option<GoogleCloudBuild>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster: Option<ClusterDetails>,
}

impl TryFrom<RawBuildConfig> for BuildConfig {
    type Error = OneOfError;

    fn try_from(raw: RawBuildConfig) -> Result<Self, Self::Error> {
        let RawBuildConfig {
            artifacts,
            insecure_registries,
            tag_policy,
            local,
            google_cloud_build,
            cluster,
        } = raw;
        Ok(Self {
            artifacts,
            insecure_registries,
            tag_policy,
            build_type: BuildType::from_slots(BuildTypeSlots {
                local,
                google_cloud_build,
                cluster,
            })?,
        })
    }
}

impl From<BuildConfig> for RawBuildConfig {
    fn from(config: BuildConfig) -> Self {
        let BuildConfig {
            artifacts,
            insecure_registries,
            tag_policy,
            build_type,
        } = config;
        let BuildTypeSlots {
            local,
            google_cloud_build,
            cluster,
        } = BuildType::into_slots(build_type);
        Self {
            artifacts,
            insecure_registries,
            tag_policy,
            local,
            google_cloud_build,
            cluster,
        }
    }
}

one_of! {
    /// How built images are tagged.
    pub enum TagPolicy in TagPolicySlots {
        "gitCommit" => git_commit: GitCommit(GitTagger),
        "sha256" => sha256: Sha256(ShaTagger),
        "envTemplate" => env_template: EnvTemplate(EnvTemplateTagger),
        "dateTime" => date_time: DateTime(DateTimeTagger),
    }
}

one_of! {
    /// Where images are built.
    pub enum BuildType in BuildTypeSlots {
        "local" => local: Local(LocalBuild),
        "googleCloudBuild" => google_cloud_build: GoogleCloudBuild(GoogleCloudBuild),
        "cluster" => cluster: Cluster(ClusterDetails),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitTagger {
    /// `Tags` when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub variant: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShaTagger {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnvTemplateTagger {
    pub template: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DateTimeTagger {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct LocalBuild {
    /// Unset means push unless the kube context is local.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push: Option<bool>,
    #[serde(rename = "useDockerCLI", skip_serializing_if = "is_default")]
    pub use_docker_cli: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub use_buildkit: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GoogleCloudBuild {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(skip_serializing_if = "is_default")]
    pub disk_size_gb: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub machine_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub docker_image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub maven_image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gradle_image: String,
}

/// Builds run as pods in the current cluster.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ClusterDetails {
    #[serde(rename = "HTTP_PROXY", skip_serializing_if = "String::is_empty")]
    pub http_proxy: String,
    #[serde(rename = "HTTPS_PROXY", skip_serializing_if = "String::is_empty")]
    pub https_proxy: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pull_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pull_secret_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_config: Option<DockerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

/// Docker credentials mounted into the build pod.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceRequirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceRequirement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceRequirement>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResourceRequirement {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cpu: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub memory: String,
}

/// An image to build.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "RawArtifact", into = "RawArtifact")]
pub struct Artifact {
    pub image: String,
    pub context: String,
    pub sync: Option<Sync>,
    pub artifact_type: Option<ArtifactType>,
    pub requires: Vec<ArtifactDependency>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawArtifact {
    image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    context: String,
    #[serde(
        deserialize_with = "Sync::deserialize_slot",
        serialize_with = "Sync::serialize_slot",
        skip_serializing_if = "Option::is_none"
    )]
    sync: Option<Sync>,
    #[serde(skip_serializing_if = "Option::is_none")]
    docker: Option<DockerArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bazel: Option<BazelArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jib: Option<JibArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kaniko: Option<KanikoArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buildpacks: Option<BuildpackArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom: Option<CustomArtifact>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    requires: Vec<ArtifactDependency>,
}

impl TryFrom<RawArtifact> for Artifact {
    type Error = OneOfError;

    fn try_from(raw: RawArtifact) -> Result<Self, Self::Error> {
        let RawArtifact {
            image,
            context,
            sync,
            docker,
            bazel,
            jib,
            kaniko,
            buildpacks,
            custom,
            requires,
        } = raw;
        Ok(Self {
            image,
            context,
            sync,
            artifact_type: ArtifactType::from_slots(ArtifactTypeSlots {
                docker,
                bazel,
                jib,
                kaniko,
                buildpacks,
                custom,
            })?,
            requires,
        })
    }
}

impl From<Artifact> for RawArtifact {
    fn from(artifact: Artifact) -> Self {
        let Artifact {
            image,
            context,
            sync,
            artifact_type,
            requires,
        } = artifact;
        let ArtifactTypeSlots {
            docker,
            bazel,
            jib,
            kaniko,
            buildpacks,
            custom,
        } = ArtifactType::into_slots(artifact_type);
        Self {
            image,
            context,
            sync,
            docker,
            bazel,
            jib,
            kaniko,
            buildpacks,
            custom,
            requires,
        }
    }
}

one_of! {
    /// Which builder produces the image.
    pub enum ArtifactType in ArtifactTypeSlots {
        "docker" => docker: Docker(DockerArtifact),
        "bazel" => bazel: Bazel(BazelArtifact),
        "jib" => jib: Jib(JibArtifact),
        "kaniko" => kaniko: Kaniko(KanikoArtifact),
        "buildpacks" => buildpacks: Buildpacks(BuildpackArtifact),
        "custom" => custom: Custom(CustomArtifact),
    }
}

one_of! {
    /// How local changes are copied into running containers.
    pub enum Sync in SyncSlots {
        "manual" => manual: Manual(Vec<SyncRule>),
        /// Destinations inferred from the builder, for these patterns.
        "infer" => infer: Infer(Vec<String>),
        "auto" => auto: Auto(bool),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncRule {
    pub src: String,
    pub dest: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub strip: String,
}

/// Another artifact that must be built first, optionally exposed under an alias.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactDependency {
    pub image: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerArtifact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, Option<String>>,
    /// Passed to `docker build --network`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cache_from: Vec<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub no_cache: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BazelArtifact {
    pub target: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JibArtifact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub plugin_type: String,
}

/// A Dockerfile built by the kaniko executor inside the cluster.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KanikoArtifact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, Option<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// Executor image.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<KanikoCache>,
    #[serde(
        deserialize_with = "KanikoBuildContext::deserialize_slot",
        serialize_with = "KanikoBuildContext::serialize_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub build_context: Option<KanikoBuildContext>,
    #[serde(skip_serializing_if = "is_default")]
    pub reproducible: bool,
}

one_of! {
    /// Where kaniko reads the build context from.
    pub enum KanikoBuildContext in KanikoBuildContextSlots {
        "gcsBucket" => gcs_bucket: GcsBucket(String),
        "localDir" => local_dir: LocalDir(LocalDir),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct LocalDir {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub init_image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KanikoCache {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo: String,
    /// Node directory holding cached base images.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct BuildpackArtifact {
    pub builder: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_descriptor: String,
}

/// Built by a user supplied command.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CustomArtifact {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<CustomDependencies>,
}

/// Rebuild triggers. `dockerfile`, `command` and `paths` are alternatives;
/// `ignore` only applies to `paths`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CustomDependencies {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<DockerfileDependency>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DockerfileDependency {
    pub path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub build_args: BTreeMap<String, Option<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct TestCase {
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub structure_tests: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(try_from = "RawDeployConfig", into = "RawDeployConfig")]
pub struct DeployConfig {
    pub deploy_type: Option<DeployType>,
    pub status_check_deadline_seconds: Option<u32>,
    pub kube_context: String,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
struct RawDeployConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    helm: Option<HelmDeploy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kubectl: Option<KubectlDeploy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kustomize: Option<KustomizeDeploy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kpt: Option<KptDeploy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_check_deadline_seconds: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    kube_context: String,
}

impl TryFrom<RawDeployConfig> for DeployConfig {
    type Error = OneOfError;

    fn try_from(raw: RawDeployConfig) -> Result<Self, Self::Error> {
        let RawDeployConfig {
            helm,
            kubectl,
            kustomize,
            kpt,
            status_check_deadline_seconds,
            kube_context,
        } = raw;
        Ok(Self {
            deploy_type: DeployType::from_slots(DeployTypeSlots {
                helm,
                kubectl,
                kustomize,
                kpt,
            })?,
            status_check_deadline_seconds,
            kube_context,
        })
    }
}

impl From<DeployConfig> for RawDeployConfig {
    fn from(config: DeployConfig) -> Self {
        let DeployConfig {
            deploy_type,
            status_check_deadline_seconds,
            kube_context,
        } = config;
        let DeployTypeSlots {
            helm,
            kubectl,
            kustomize,
            kpt,
        } = DeployType::into_slots(deploy_type);
        Self {
            helm,
            kubectl,
            kustomize,
            kpt,
            status_check_deadline_seconds,
            kube_context,
        }
    }
}

one_of! {
    /// How manifests reach the cluster.
    pub enum DeployType in DeployTypeSlots {
        "helm" => helm: Helm(HelmDeploy),
        "kubectl" => kubectl: Kubectl(KubectlDeploy),
        "kustomize" => kustomize: Kustomize(KustomizeDeploy),
        "kpt" => kpt: Kpt(KptDeploy),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmDeploy {
    pub releases: Vec<HelmRelease>,
    #[serde(skip_serializing_if = "is_default")]
    pub flags: HelmDeployFlags,
}

/// Extra arguments per helm subcommand.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmDeployFlags {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub install: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upgrade: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HelmRelease {
    pub name: String,
    pub chart_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values_files: Vec<String>,
    /// Helm value to image name; the built tag is substituted.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub set_values: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub set_value_templates: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "is_default")]
    pub wait: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub recreate_pods: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub skip_build_dependencies: bool,
    #[serde(skip_serializing_if = "is_default")]
    pub use_helm_secrets: bool,
    /// The chart lives in a remote repository.
    #[serde(skip_serializing_if = "is_default")]
    pub remote: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, serde_yaml::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packaged: Option<HelmPackaged>,
    #[serde(
        deserialize_with = "HelmImageStrategy::deserialize_slot",
        serialize_with = "HelmImageStrategy::serialize_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_strategy: Option<HelmImageStrategy>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HelmPackaged {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_version: String,
}

one_of! {
    /// How image references are written into helm values.
    pub enum HelmImageStrategy in HelmImageStrategySlots {
        "fqn" => fqn: Fqn(HelmFqnConfig),
        "helm" => helm: Helm(HelmConventionConfig),
    }
}

/// The full image reference goes into one property.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HelmFqnConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub property: String,
}

/// Repository and tag go into `image.repository` and `image.tag`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct HelmConventionConfig {
    #[serde(skip_serializing_if = "is_default")]
    pub explicit_registry: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KubectlDeploy {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remote_manifests: Vec<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub flags: KubectlFlags,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KubectlFlags {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub apply: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KustomizeDeploy {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(skip_serializing_if = "is_default")]
    pub flags: KubectlFlags,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct KptDeploy {
    pub dir: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct PortForwardResource {
    pub resource_type: String,
    pub resource_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,
}

/// Named partial configuration overlaid on the base when selected.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub activation: Vec<Activation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patches: Vec<JsonPatch>,
    #[serde(skip_serializing_if = "is_default")]
    pub build: BuildConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<TestCase>,
    #[serde(skip_serializing_if = "is_default")]
    pub deploy: DeployConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_forward: Vec<PortForwardResource>,
}

/// A profile is activated when any of its entries matches. An entry matches
/// when every criterion it sets matches.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct Activation {
    /// `KEY=regex`, matched against the environment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub env: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kube_context: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
}

/// One RFC 6902 operation applied to the document after the profile overlay.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JsonPatch {
    /// Defaults to `replace`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}
