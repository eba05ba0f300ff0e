use pretty_assertions::assert_eq;
use skfix::schema::{self, latest, parse_and_upgrade, SCHEMA_VERSIONS};

/// The same pipeline, written against every supported version.
const DOCUMENTS: &[(&str, &str)] = &[
    (
        "skaffold/v1beta6",
        r#"
apiVersion: skaffold/v1beta6
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      "*.html": /srv
    plugin:
      name: docker
      properties:
        dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta7",
        r#"
apiVersion: skaffold/v1beta7
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      "*.html": /srv
    docker:
      dockerfile: Dockerfile.dev
  executionEnvironment:
    name: local
    properties:
      push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta8",
        r#"
apiVersion: skaffold/v1beta8
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      "*.html": /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta9",
        r#"
apiVersion: skaffold/v1beta9
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      "*.html": /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    skipPush: true
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta10",
        r#"
apiVersion: skaffold/v1beta10
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      manual:
      - src: "*.html"
        dest: /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta11",
        r#"
apiVersion: skaffold/v1beta11
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      manual:
      - src: "*.html"
        dest: /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta12",
        r#"
apiVersion: skaffold/v1beta12
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      manual:
      - src: "*.html"
        dest: /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v1beta13",
        r#"
apiVersion: skaffold/v1beta13
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      manual:
      - src: "*.html"
        dest: /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    path: overlays/dev
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
    (
        "skaffold/v2alpha1",
        r#"
apiVersion: skaffold/v2alpha1
kind: Config
build:
  tagPolicy:
    sha256: {}
  artifacts:
  - image: app
    context: app
    sync:
      manual:
      - src: "*.html"
        dest: /srv
    docker:
      dockerfile: Dockerfile.dev
  local:
    push: false
test:
- image: app
  structureTests: [./test/*.yaml]
deploy:
  kustomize:
    paths: [overlays/dev]
profiles:
- name: dev
  activation:
  - kubeContext: minikube
  patches:
  - path: /build/artifacts/0/context
    value: dev
"#,
    ),
];

#[test]
fn every_version_has_a_document() {
    let versions: Vec<_> = SCHEMA_VERSIONS.iter().map(|v| v.api_version).collect();
    let documented: Vec<_> = DOCUMENTS.iter().map(|(v, _)| *v).collect();
    assert_eq!(versions, documented);
}

#[test]
fn every_version_reaches_the_same_latest_config() {
    let expected: latest::Config = serde_yaml::from_str(DOCUMENTS[DOCUMENTS.len() - 1].1).unwrap();
    for (version, doc) in DOCUMENTS {
        let upgraded = parse_and_upgrade(doc.as_bytes())
            .unwrap_or_else(|err| panic!("{version}: {err}"));
        assert_eq!(upgraded.from, *version);
        assert!(upgraded.warnings.is_empty(), "{version}: {:?}", upgraded.warnings);
        assert_eq!(upgraded.config.api_version, schema::LATEST);
        assert_eq!(upgraded.config, expected, "{version}");
    }
}

#[test]
fn upgraded_output_is_a_latest_document() {
    for (version, doc) in DOCUMENTS {
        let upgraded = parse_and_upgrade(doc.as_bytes()).unwrap();
        let written = serde_yaml::to_string(&upgraded.config).unwrap();
        let again = parse_and_upgrade(written.as_bytes())
            .unwrap_or_else(|err| panic!("{version}: {err}\n{written}"));
        assert_eq!(again.from, schema::LATEST);
        assert_eq!(again.config, upgraded.config);
    }
}

#[test]
fn each_version_rejects_its_successors_fields() {
    let cases = [
        ("skaffold/v1beta6", "build:\n  cluster: {}\n"),
        ("skaffold/v1beta7", "build:\n  local:\n    skipPush: true\n"),
        ("skaffold/v1beta8", "build:\n  executionEnvironment: {}\n"),
        ("skaffold/v1beta9", "build:\n  local:\n    push: true\n"),
        ("skaffold/v1beta10", "build:\n  artifacts:\n  - image: app\n    custom: {}\n"),
        ("skaffold/v1beta11", "metadata:\n  name: app\n"),
        ("skaffold/v1beta12", "build:\n  cluster:\n    resources: {}\n"),
        ("skaffold/v1beta13", "build:\n  artifacts:\n  - image: app\n    jib: {}\n"),
        ("skaffold/v2alpha1", "build:\n  artifacts:\n  - image: app\n    jibMaven: {}\n"),
    ];
    for (version, body) in cases {
        let doc = format!("apiVersion: {version}\nkind: Config\n{body}");
        match parse_and_upgrade(doc.as_bytes()) {
            Err(schema::Error::Parse { version: v, .. }) => assert_eq!(v, version),
            other => panic!("{version}: unexpected result {other:?}"),
        }
    }
}
