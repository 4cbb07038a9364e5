//! Agent lifecycle, scene broadcast, and concurrency behavior.

use async_trait::async_trait;
use greenroom_dispatch::{
    CollaboratorError, DispatchConfig, DispatchError, NpcAgent, NpcEngine, Router,
};
use greenroom_types::{ContextUpdate, SceneUpdate, Utterance};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct NullEngine;

#[async_trait]
impl NpcEngine for NullEngine {
    async fn inject_context(
        &self,
        _update: ContextUpdate,
        _cancel: CancellationToken,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Agent that records received scene updates, or fails on request.
struct SceneNpc {
    id: String,
    name: String,
    fail_scenes: bool,
    scenes: Mutex<Vec<SceneUpdate>>,
}

impl SceneNpc {
    fn new(id: &str, name: &str, fail_scenes: bool) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            name: name.to_string(),
            fail_scenes,
            scenes: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl NpcAgent for SceneNpc {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn engine(&self) -> Arc<dyn NpcEngine> {
        Arc::new(NullEngine)
    }

    async fn update_scene(
        &self,
        scene: &SceneUpdate,
        _cancel: CancellationToken,
    ) -> Result<(), CollaboratorError> {
        if self.fail_scenes {
            return Err("agent unreachable".into());
        }
        self.scenes.lock().unwrap().push(scene.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle operations
// ---------------------------------------------------------------------------

#[test]
fn test_duplicate_registration_fails() {
    let router = Router::new(DispatchConfig::default());
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", false))
        .unwrap();
    let err = router
        .add_agent(SceneNpc::new("grimjaw-1", "Impostor", false))
        .unwrap_err();
    assert!(matches!(err, DispatchError::DuplicateAgent(_)));
}

#[test]
fn test_management_ops_on_unknown_id_fail() {
    let router = Router::new(DispatchConfig::default());
    assert!(matches!(
        router.remove_agent("nobody").unwrap_err(),
        DispatchError::UnknownAgent(_)
    ));
    assert!(matches!(
        router.mute_agent("nobody").unwrap_err(),
        DispatchError::UnknownAgent(_)
    ));
    assert!(matches!(
        router.unmute_agent("nobody").unwrap_err(),
        DispatchError::UnknownAgent(_)
    ));
    assert!(matches!(
        router.set_puppet("dm-1", Some("nobody")).unwrap_err(),
        DispatchError::UnknownAgent(_)
    ));
}

#[test]
fn test_active_agents_snapshot_includes_muted() {
    let router = Router::new(DispatchConfig::default());
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", false))
        .unwrap();
    router.mute_agent("grimjaw-1").unwrap();

    let agents = router.active_agents().unwrap();
    assert_eq!(agents.len(), 2);
    assert!(agents
        .iter()
        .any(|row| row.agent.id() == "grimjaw-1" && row.muted));
    assert!(agents
        .iter()
        .any(|row| row.agent.id() == "elara-1" && !row.muted));
}

#[tokio::test]
async fn test_removal_clears_continuation() {
    let router = Router::new(DispatchConfig::default());
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("keeper-1", "Tavernkeep", false))
        .unwrap();

    let cancel = CancellationToken::new();
    router
        .route(&cancel, "player-7", &Utterance::new("Rosa", "elara, over here"))
        .await
        .unwrap();
    router.remove_agent("elara-1").unwrap();

    // Continuation is gone and two agents remain active, so a follow-up
    // with no address resolves to nothing.
    let err = router
        .route(&cancel, "player-7", &Utterance::new("Rosa", "tell me more"))
        .await
        .unwrap_err();
    assert!(err.is_no_target());
}

#[tokio::test]
async fn test_removal_clears_puppet_overrides() {
    let router = Router::new(DispatchConfig::default());
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("keeper-1", "Tavernkeep", false))
        .unwrap();
    router.set_puppet("dm-1", Some("elara-1")).unwrap();

    router.remove_agent("elara-1").unwrap();

    let cancel = CancellationToken::new();
    let err = router
        .route(&cancel, "dm-1", &Utterance::new("DM", "carry on"))
        .await
        .unwrap_err();
    assert!(err.is_no_target());
}

#[tokio::test]
async fn test_mute_then_unmute_restores_routing() {
    let router = Router::new(DispatchConfig::default());
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", false))
        .unwrap();

    let cancel = CancellationToken::new();
    router.mute_agent("elara-1").unwrap();
    assert!(router
        .route(&cancel, "player-7", &Utterance::new("Rosa", "anyone there?"))
        .await
        .unwrap_err()
        .is_no_target());

    router.unmute_agent("elara-1").unwrap();
    let agent = router
        .route(&cancel, "player-7", &Utterance::new("Rosa", "anyone there?"))
        .await
        .unwrap();
    assert_eq!(agent.id(), "elara-1");
}

// ---------------------------------------------------------------------------
// Scene broadcast
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_broadcast_skips_muted_agents() {
    let router = Router::new(DispatchConfig::default());
    let grimjaw = SceneNpc::new("grimjaw-1", "Grimjaw", false);
    let elara = SceneNpc::new("elara-1", "Elara", false);
    router.add_agent(grimjaw.clone()).unwrap();
    router.add_agent(elara.clone()).unwrap();
    router.mute_agent("grimjaw-1").unwrap();

    let cancel = CancellationToken::new();
    let scene = SceneUpdate::new("the market square at dusk");
    router.broadcast_scene(&cancel, &scene).await.unwrap();

    assert!(grimjaw.scenes.lock().unwrap().is_empty());
    assert_eq!(elara.scenes.lock().unwrap().len(), 1);
    assert_eq!(
        elara.scenes.lock().unwrap()[0].description,
        "the market square at dusk"
    );
}

#[tokio::test]
async fn test_broadcast_attempts_all_and_aggregates_failures() {
    let router = Router::new(DispatchConfig::default());
    let healthy = SceneNpc::new("keeper-1", "Tavernkeep", false);
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", true))
        .unwrap();
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", true))
        .unwrap();
    router.add_agent(healthy.clone()).unwrap();

    let cancel = CancellationToken::new();
    let scene = SceneUpdate::new("rain hammers the roof");
    let err = router.broadcast_scene(&cancel, &scene).await.unwrap_err();

    match err {
        DispatchError::SceneBroadcast { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().any(|f| f.starts_with("grimjaw-1:")));
            assert!(failures.iter().any(|f| f.starts_with("elara-1:")));
        }
        other => panic!("expected SceneBroadcast, got {other:?}"),
    }

    // The healthy agent was still reached.
    assert_eq!(healthy.scenes.lock().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_routes_and_mutations() {
    let router = Arc::new(Router::new(DispatchConfig::default()));
    router
        .add_agent(SceneNpc::new("grimjaw-1", "Grimjaw", false))
        .unwrap();
    router
        .add_agent(SceneNpc::new("elara-1", "Elara", false))
        .unwrap();

    let mut tasks = Vec::new();
    for worker in 0..8 {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            let cancel = CancellationToken::new();
            for round in 0..50 {
                match worker % 4 {
                    0 => {
                        // Routes may legitimately fail (no target while the
                        // mute workers are active); they must never deadlock.
                        let _ = router
                            .route(
                                &cancel,
                                "player-7",
                                &Utterance::new("Rosa", "grimjaw, still with us?"),
                            )
                            .await;
                    }
                    1 => {
                        let _ = router.mute_agent("grimjaw-1");
                        let _ = router.unmute_agent("grimjaw-1");
                    }
                    2 => {
                        router
                            .record_npc_utterance("elara-1", "Elara", &format!("line {round}"))
                            .unwrap();
                    }
                    _ => {
                        let _ = router.active_agents().unwrap();
                        let _ = router.utterance_log().unwrap();
                    }
                }
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    // State is still coherent after the storm.
    assert_eq!(router.active_agents().unwrap().len(), 2);
}
