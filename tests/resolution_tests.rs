//! Integration tests for build target resolution
//!
//! These tests verify:
//! - Config file precedence (game, compiler, default game)
//! - Project file targets and release variants
//! - Partial success when one of config/project file is broken
//! - Compiler path gating and its advisories

use build_papyrus::models::{ACTIVE_FILE_PLACEHOLDER, ERROR_MATCH};
use build_papyrus::notifications::LogNotificationSink;
use build_papyrus::{
    BuildTarget, CompilerSource, Game, MemorySettingsStore, PapyrusBuildProvider, RefreshListener,
    ResolveError,
};
use camino::Utf8PathBuf;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct NoRefresh;

impl RefreshListener for NoRefresh {
    fn refresh(&self) {}
}

struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
    project: Utf8PathBuf,
    store: MemorySettingsStore,
    sink: Arc<LogNotificationSink>,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let project = root.join("project");
        fs::create_dir(&project).unwrap();

        Self {
            _temp: temp,
            root,
            project,
            store: MemorySettingsStore::new(),
            sink: Arc::new(LogNotificationSink::new()),
        }
    }

    /// Create a fake compiler for a game and point its setting at it
    fn install_compiler(&self, game: Game) -> Utf8PathBuf {
        let dir = self.root.join(format!("{} Papyrus Compiler", game.title()));
        fs::create_dir_all(&dir).unwrap();
        let compiler = dir.join("PapyrusCompiler.exe");
        fs::write(&compiler, b"MZ").unwrap();
        self.store.set(&game.compiler_path_key(), compiler.as_str());
        compiler
    }

    fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.project.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn provider(&self) -> PapyrusBuildProvider {
        PapyrusBuildProvider::new(
            self.project.clone(),
            Arc::new(self.store.clone()),
            self.sink.clone(),
            Arc::new(NoRefresh),
        )
    }

    async fn resolve(&self) -> (PapyrusBuildProvider, Result<Vec<BuildTarget>, ResolveError>) {
        let mut provider = self.provider();
        provider.scan().unwrap();
        let result = provider.settings().await;
        (provider, result)
    }
}

fn names(targets: &[BuildTarget]) -> Vec<&str> {
    targets.iter().map(|t| t.name.as_str()).collect()
}

#[tokio::test]
async fn test_config_game_uses_that_games_compiler() {
    let ws = Workspace::new();
    let compiler = ws.install_compiler(Game::Fallout4);
    ws.install_compiler(Game::Skyrim);
    ws.write(".papyrus.json", r#"{ "game": "fallout4", "imports": ["Source"] }"#);

    let (provider, result) = ws.resolve().await;
    let targets = result.unwrap();

    assert_eq!(provider.state().game, Game::Fallout4);
    assert_eq!(targets.len(), 3);
    for target in &targets {
        assert_eq!(target.exec, compiler);
        assert_eq!(target.cwd.as_path(), compiler.parent().unwrap());
        assert!(!target.shell);
        assert_eq!(target.error_match, ERROR_MATCH);
    }

    assert_eq!(
        targets[0].args,
        vec![
            ACTIVE_FILE_PLACEHOLDER.to_string(),
            format!("-import={}", ws.project.join("Source")),
            "-output=.".to_string(),
            "-flags=Institute_Papyrus_Flags.flg".to_string(),
            "-optimize".to_string(),
        ]
    );
    assert_eq!(targets[1].args.last().unwrap(), "-release");
    assert_eq!(&targets[2].args[targets[2].args.len() - 2..], ["-release", "-final"]);
}

#[tokio::test]
async fn test_game_slug_is_case_insensitive() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.yml", "game: Fallout4\nimports: []\n");

    let (provider, result) = ws.resolve().await;
    assert!(result.is_ok());
    assert_eq!(provider.state().game, Game::Fallout4);
}

#[tokio::test]
async fn test_missing_game_and_compiler_without_project() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.json", r#"{ "imports": ["Source"] }"#);

    let (_, result) = ws.resolve().await;
    assert!(matches!(result, Err(ResolveError::MissingGameOrCompiler)));
}

#[tokio::test]
async fn test_unknown_game_does_not_fall_back_to_default() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.json", r#"{ "game": "oblivion", "imports": [] }"#);
    ws.write("Mod.ppj", "");

    let (provider, result) = ws.resolve().await;
    match result {
        Err(ResolveError::UnknownGame(slug)) => assert_eq!(slug, "oblivion"),
        other => panic!("expected UnknownGame, got {other:?}"),
    }
    assert_eq!(provider.state().game, Game::Unknown);
}

#[tokio::test]
async fn test_project_file_with_default_game_yields_three_targets() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    let compiler = ws.install_compiler(Game::Fallout4);
    let ppj = ws.write("MyMod.ppj", "<PapyrusProject/>");

    let (provider, result) = ws.resolve().await;
    let targets = result.unwrap();

    assert_eq!(provider.state().game, Game::Fallout4);
    assert_eq!(
        names(&targets),
        vec![
            "Papyrus: MyMod.ppj",
            "Papyrus: MyMod.ppj (release)",
            "Papyrus: MyMod.ppj (final release)",
        ]
    );
    assert_eq!(targets[0].args, vec![ppj.to_string()]);
    assert_eq!(targets[1].args, vec![ppj.to_string(), "-release".to_string()]);
    assert_eq!(
        targets[2].args,
        vec![ppj.to_string(), "-release".to_string(), "-final".to_string()]
    );
    assert!(targets.iter().all(|t| t.exec == compiler));
}

#[tokio::test]
async fn test_project_file_for_game_without_release_variants() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "skyrim");
    ws.install_compiler(Game::Skyrim);
    ws.write("MyMod.ppj", "");

    let (_, result) = ws.resolve().await;
    assert!(matches!(
        result,
        Err(ResolveError::ProjectFileUnsupported(Game::Skyrim))
    ));
}

#[tokio::test]
async fn test_invalid_default_game_is_fatal_for_project_files() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "morrowind");
    ws.install_compiler(Game::Fallout4);
    ws.write("MyMod.ppj", "");

    let (_, result) = ws.resolve().await;
    match result {
        Err(ResolveError::InvalidDefaultGame(slug)) => assert_eq!(slug, "morrowind"),
        other => panic!("expected InvalidDefaultGame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_config_without_game_uses_default_with_project_file() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.toml", "imports = []\n");
    ws.write("MyMod.ppj", "");

    let (provider, result) = ws.resolve().await;
    let targets = result.unwrap();
    assert_eq!(provider.state().game, Game::Fallout4);
    // Project targets only: a config without game or compiler isn't buildable
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| t.name.contains("MyMod.ppj")));
}

#[tokio::test]
async fn test_missing_output_directory_keeps_project_targets() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(
        ".papyrus.json",
        r#"{ "game": "fallout4", "imports": [], "output": "does-not-exist" }"#,
    );
    ws.write("MyMod.ppj", "");

    let (_, result) = ws.resolve().await;
    let targets = result.unwrap();
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| !t.args.contains(&ACTIVE_FILE_PLACEHOLDER.to_string())));
}

#[tokio::test]
async fn test_missing_output_directory_without_project_fails() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    ws.write(
        ".papyrus.json",
        r#"{ "game": "fallout4", "imports": [], "output": "does-not-exist" }"#,
    );

    let (_, result) = ws.resolve().await;
    match result {
        Err(ResolveError::InvalidOutputDirectory(dir)) => {
            assert_eq!(dir, ws.project.join("does-not-exist"))
        }
        other => panic!("expected InvalidOutputDirectory, got {other:?}"),
    }
}

#[tokio::test]
async fn test_project_and_config_targets_combine() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    fs::create_dir(ws.project.join("Scripts")).unwrap();
    ws.write(
        ".papyrus.yml",
        "game: fallout4\nimports: [Source/User, Source/Base]\noutput: Scripts\nflags: Custom.flg\noptimize: false\n",
    );
    ws.write("MyMod.ppj", "");

    let (_, result) = ws.resolve().await;
    let targets = result.unwrap();
    assert_eq!(targets.len(), 6);

    let config_target = &targets[3];
    assert_eq!(config_target.name, "Papyrus: active file");
    assert_eq!(
        config_target.args,
        vec![
            ACTIVE_FILE_PLACEHOLDER.to_string(),
            format!(
                "-import={};{}",
                ws.project.join("Source/User"),
                ws.project.join("Source/Base")
            ),
            format!("-output={}", ws.project.join("Scripts")),
            "-flags=Custom.flg".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_imports_must_be_a_list() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Skyrim);
    ws.write(".papyrus.json", r#"{ "game": "skyrim", "imports": "Source" }"#);

    let (_, result) = ws.resolve().await;
    assert!(matches!(result, Err(ResolveError::MissingImportsList)));
}

#[tokio::test]
async fn test_custom_compiler_skips_game_path_check() {
    let ws = Workspace::new();
    let custom = ws.root.join("Custom").join("Compiler.exe");
    fs::create_dir_all(custom.parent().unwrap()).unwrap();
    fs::write(&custom, b"").unwrap();
    // Fallout 4's configured compiler doesn't exist
    ws.store.set("fallout4CompilerPath", "/missing/PapyrusCompiler.exe");

    let config = serde_json::json!({
        "game": "fallout4",
        "compiler": custom.as_str(),
        "imports": [],
    });
    ws.write(".papyrus.json", &config.to_string());

    let (_, result) = ws.resolve().await;
    let targets = result.unwrap();
    assert!(targets.iter().all(|t| t.exec == custom));
    assert_eq!(targets[0].cwd, ws.root.join("Custom"));
    assert_eq!(ws.sink.created_count(), 0);
}

#[tokio::test]
async fn test_missing_custom_compiler_fails() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    let config = serde_json::json!({
        "game": "fallout4",
        "compiler": ws.root.join("nope.exe").as_str(),
        "imports": [],
    });
    ws.write(".papyrus.json", &config.to_string());

    let (_, result) = ws.resolve().await;
    let err = result.unwrap_err();
    assert!(err.is_compiler_path_error());
    match err {
        ResolveError::InvalidCompilerPath(CompilerSource::Custom(path)) => {
            assert_eq!(path, ws.root.join("nope.exe"))
        }
        other => panic!("expected InvalidCompilerPath, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_custom_compiler_without_game_fails() {
    let ws = Workspace::new();
    let config = serde_json::json!({
        "compiler": ws.root.join("tools/missing.exe").as_str(),
        "imports": [],
        "flags": "Custom.flg",
    });
    ws.write(".papyrus.json", &config.to_string());

    let (provider, result) = ws.resolve().await;
    assert!(matches!(
        result,
        Err(ResolveError::InvalidCompilerPath(CompilerSource::Custom(_)))
    ));
    assert_eq!(provider.state().game, Game::Unknown);
    assert_eq!(ws.sink.created_count(), 0);
}

#[tokio::test]
async fn test_invalid_game_compiler_raises_one_advisory() {
    let ws = Workspace::new();
    ws.store.set("fallout4CompilerPath", "/missing/PapyrusCompiler.exe");
    ws.write(".papyrus.json", r#"{ "game": "fallout4", "imports": [] }"#);

    let (provider, first) = ws.resolve().await;
    let second = provider.settings().await;

    for result in [first, second] {
        assert!(matches!(
            result,
            Err(ResolveError::InvalidCompilerPath(CompilerSource::Game(Game::Fallout4)))
        ));
    }
    assert_eq!(ws.sink.created_count(), 1);
    assert_eq!(ws.sink.active_count(), 1);
    assert!(ws.sink.notifications()[0].message().contains("Fallout 4"));
}

#[tokio::test]
async fn test_config_edits_are_picked_up_without_rescan() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    ws.install_compiler(Game::Skyrim);
    let config = ws.write(".papyrus.json", r#"{ "game": "fallout4", "imports": [] }"#);

    let (provider, result) = ws.resolve().await;
    assert_eq!(result.unwrap().len(), 3);

    fs::write(&config, r#"{ "game": "skyrim", "imports": [] }"#).unwrap();
    let targets = provider.settings().await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(provider.state().game, Game::Skyrim);
}

#[tokio::test]
async fn test_empty_config_with_project_file_builds_project() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.yml", "");
    ws.write("MyMod.ppj", "");

    let (_, result) = ws.resolve().await;
    let targets = result.unwrap();
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| t.name.contains("MyMod.ppj")));
}

#[tokio::test]
async fn test_empty_config_alone_needs_game_or_compiler() {
    let ws = Workspace::new();
    ws.store.set("defaultGame", "fallout4");
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.yml", "");

    let (mut provider, result) = ws.resolve().await;
    assert!(provider.is_eligible().unwrap());
    assert!(matches!(result, Err(ResolveError::MissingGameOrCompiler)));
}

#[tokio::test]
async fn test_config_with_non_map_root_needs_game_or_compiler() {
    let ws = Workspace::new();
    ws.install_compiler(Game::Fallout4);
    ws.write(".papyrus.json", r#"["fallout4"]"#);

    let (_, result) = ws.resolve().await;
    assert!(matches!(result, Err(ResolveError::MissingGameOrCompiler)));
}

#[tokio::test]
async fn test_ineligible_directory_fails_resolution() {
    let ws = Workspace::new();
    let (_, result) = ws.resolve().await;
    assert!(matches!(result, Err(ResolveError::NotEligible(_))));
}
