//! Integration tests for Git registries mirrored through the cache.
//!
//! The remote is a local repository addressed by a `file://` URL, so no
//! network access is needed.

use std::fs;
use std::path::Path;

use git2::{Commit, IndexAddOption, Oid, Repository, Signature};
use stencil::cache::RegistryCache;
use stencil::config::GlobalConfig;
use stencil::StencilError;
use tempfile::TempDir;

fn manifest(name: &str, platform: &str) -> String {
    format!("name: {name}\nplatform: {platform}\nfiles:\n  - src: {name}.txt\n    dst: {name}.txt\n")
}

fn write_component(workdir: &Path, platform: &str, name: &str) {
    let dir = workdir.join(platform).join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("stencil.yaml"), manifest(name, platform)).unwrap();
    fs::write(dir.join(format!("{name}.txt")), format!("{{{{title}}}} {name}\n")).unwrap();
}

/// Stage everything in the work tree and commit it onto `update_ref`.
fn commit_all(repo: &Repository, update_ref: &str, parent: Option<&Commit<'_>>) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Stencil Tests", "tests@example.com").unwrap();
    let parents: Vec<&Commit<'_>> = parent.into_iter().collect();
    repo.commit(
        Some(update_ref),
        &signature,
        &signature,
        "update components",
        &tree,
        &parents,
    )
    .unwrap()
}

struct Remote {
    _temp: TempDir,
    repo: Repository,
    url: String,
}

/// Initialise a repository at `dir` holding one web component; returns its URL.
fn init_remote(dir: &Path, component: &str) -> (Repository, String) {
    fs::create_dir_all(dir).unwrap();
    let repo = Repository::init(dir).unwrap();
    write_component(dir, "web", component);
    commit_all(&repo, "HEAD", None);
    let url = format!("file://{}", dir.display());
    (repo, url)
}

impl Remote {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let (repo, url) = init_remote(temp.path(), "button");
        Self {
            _temp: temp,
            repo,
            url,
        }
    }

    fn workdir(&self) -> &Path {
        self.repo.workdir().unwrap()
    }

    fn head(&self) -> Commit<'_> {
        self.repo.head().unwrap().peel_to_commit().unwrap()
    }

    fn commit_on_head(&self, platform: &str, name: &str) -> Oid {
        write_component(self.workdir(), platform, name);
        let head = self.head();
        commit_all(&self.repo, "HEAD", Some(&head))
    }

    fn tag_head(&self, tag: &str) {
        let head = self.head();
        self.repo
            .tag_lightweight(tag, head.as_object(), false)
            .unwrap();
    }
}

fn component_names(registry: &stencil::registry::Registry, platform: &str) -> Vec<String> {
    registry
        .platform_components(platform)
        .unwrap()
        .into_keys()
        .collect()
}

#[test]
fn clone_then_fetch_sees_new_commits() {
    let remote = Remote::new();
    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);

    let registry = cache.get_registry(&remote.url, None, cache_dir.path()).unwrap();
    assert_eq!(component_names(&registry, "web"), vec!["button"]);
    assert_eq!(registry.name(), remote.url);
    assert!(cache.repo_path(&remote.url).exists());

    let head = remote.commit_on_head("web", "card");
    let registry = cache.get_registry(&remote.url, None, cache_dir.path()).unwrap();
    assert_eq!(component_names(&registry, "web"), vec!["button", "card"]);
    assert_eq!(registry.commit(), Some(head.to_string().as_str()));
}

#[test]
fn references_pin_tags_and_branches() {
    let remote = Remote::new();
    remote.tag_head("v1");
    remote.commit_on_head("web", "card");

    let base = remote.head();
    write_component(remote.workdir(), "mobile", "sheet");
    commit_all(&remote.repo, "refs/heads/feature", Some(&base));

    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);

    let tagged = cache.open(&format!("{}@v1", remote.url), cache_dir.path()).unwrap();
    assert_eq!(tagged.reference(), Some("v1"));
    assert_eq!(component_names(&tagged, "web"), vec!["button"]);

    let feature = cache
        .get_registry(&remote.url, Some("feature"), cache_dir.path())
        .unwrap();
    assert_eq!(component_names(&feature, "mobile"), vec!["sheet"]);

    let default = cache.get_registry(&remote.url, None, cache_dir.path()).unwrap();
    assert!(default.platform_components("mobile").is_err());
}

#[test]
fn snapshot_serves_file_contents() {
    let remote = Remote::new();
    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);

    let registry = cache.get_registry(&remote.url, None, cache_dir.path()).unwrap();
    let button = registry.resolve_component("web", "button").unwrap();
    let content = registry
        .read_file(&button.source_path("button.txt"))
        .unwrap();
    assert_eq!(content, b"{{title}} button\n");
}

#[test]
fn unknown_reference_is_a_git_error() {
    let remote = Remote::new();
    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);

    let err = cache
        .get_registry(&remote.url, Some("no-such-branch"), cache_dir.path())
        .unwrap_err();
    assert!(matches!(err, StencilError::Git { .. }));
}

#[test]
fn failed_clone_leaves_no_mirror() {
    let missing = TempDir::new().unwrap();
    let url = format!("file://{}", missing.path().join("absent").display());
    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);

    assert!(cache.get_registry(&url, None, cache_dir.path()).is_err());
    assert!(!cache.repo_path(&url).exists());
    assert!(cache.list_registries().unwrap().is_empty());
}

#[test]
fn list_and_clear_mirrors() {
    let remote = Remote::new();
    let cache_dir = TempDir::new().unwrap();
    let root = cache_dir.path().join("registries");
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(&root, &global);

    cache.get_registry(&remote.url, None, cache_dir.path()).unwrap();
    let listed = cache.list_registries().unwrap();
    assert_eq!(listed, vec![remote.url.trim_start_matches("file://").to_string()]);

    cache.clear().unwrap();
    assert!(!root.exists());
    assert!(cache.list_registries().unwrap().is_empty());
}

#[test]
fn similar_locations_get_separate_mirrors() {
    let remotes = TempDir::new().unwrap();
    let (_first, first_url) = init_remote(&remotes.path().join("a_b/c"), "first");
    let (_second, second_url) = init_remote(&remotes.path().join("a/b_c"), "second");

    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);
    assert_ne!(cache.repo_path(&first_url), cache.repo_path(&second_url));

    let first = cache.get_registry(&first_url, None, cache_dir.path()).unwrap();
    let second = cache.get_registry(&second_url, None, cache_dir.path()).unwrap();
    assert_eq!(component_names(&first, "web"), vec!["first"]);
    assert_eq!(component_names(&second, "web"), vec!["second"]);
    assert_eq!(cache.list_registries().unwrap().len(), 2);
}

#[test]
fn mirror_with_foreign_origin_is_recloned() {
    let remotes = TempDir::new().unwrap();
    let (_first, first_url) = init_remote(&remotes.path().join("first"), "first");
    let (_second, second_url) = init_remote(&remotes.path().join("second"), "second");

    let cache_dir = TempDir::new().unwrap();
    let global = GlobalConfig::default();
    let cache = RegistryCache::new(cache_dir.path(), &global);
    cache.get_registry(&first_url, None, cache_dir.path()).unwrap();
    fs::rename(cache.repo_path(&first_url), cache.repo_path(&second_url)).unwrap();

    let registry = cache.get_registry(&second_url, None, cache_dir.path()).unwrap();
    assert_eq!(component_names(&registry, "web"), vec!["second"]);
    assert_eq!(
        cache.list_registries().unwrap(),
        vec![second_url.trim_start_matches("file://").to_string()]
    );
}
