#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding a `manifests/` tree and a `secrets/` tree
pub struct TestFixture {
    _temp_dir: TempDir,
    pub base_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();
        fs::create_dir_all(base_path.join("manifests")).unwrap();
        fs::create_dir_all(base_path.join("secrets")).unwrap();
        Self {
            _temp_dir: temp_dir,
            base_path,
        }
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.base_path.join("manifests")
    }

    pub fn secrets_dir(&self) -> PathBuf {
        self.base_path.join("secrets")
    }

    /// Writes a manifest below `manifests/`
    pub fn manifest(&self, name: &str, content: &str) -> PathBuf {
        write(&self.manifests_dir(), name, content)
    }

    /// Writes a secret file below `secrets/`, e.g. `deployment.yaml`
    pub fn secret(&self, name: &str, content: &str) -> PathBuf {
        write(&self.secrets_dir(), name, content)
    }

    /// Provider specification reading from `secrets/`
    pub fn provider(&self, scheme: &str) -> String {
        format!("{}:{}", scheme, self.secrets_dir().display())
    }

    /// The standard Deployment example with its secrets
    pub fn create_deployment(&self) {
        self.manifest(
            "deployment.yaml",
            r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: <name>
  namespace: default
spec:
  replicas: <replicas>
  template:
    spec:
      containers:
        - name: <name>
          image: foo.io/<name>:<tag>
          ports:
            - containerPort: 8080
"#,
        );
        self.secret(
            "deployment.yaml",
            "name: app\ntag: \"1.4.2\"\nreplicas: 3\n",
        );
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
