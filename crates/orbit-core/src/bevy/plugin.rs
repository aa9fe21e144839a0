//! Bevy plugins for the orbit scene.
//!
//! Provides:
//! - `OrbitHeadlessPlugin`: Logic-only plugin (no rendering/window dependencies)
//!   for headless testing
//! - `OrbitScenePlugin`: Full plugin including `OrbitHeadlessPlugin` + input
//!   capture and rendering systems

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::orbit::ORBIT_DT;

/// Ordering of the per-frame logic.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrbitSet {
    /// Command queue and scene (re)loading.
    Commands,
    /// Pointer routing and body removal.
    Interaction,
    /// Graph → entity transform mirroring.
    Sync,
}

// ============================================================================
// Headless Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing all scene logic without rendering or window dependencies.
///
/// Use this plugin in tests with `MinimalPlugins` to run ECS systems
/// without requiring a windowing or rendering backend.
///
/// Excluded systems:
/// - Window-dependent input capture (capture_mouse_input, capture_touch_input,
///   track_window_viewport)
/// - Asset/render-dependent systems (attach_body_visuals, watch_asset_loads, apply_drag_highlight)
/// - Camera3d spawning (setup_scene_camera, apply_scene_camera)
#[derive(Default)]
pub struct OrbitHeadlessPlugin {
    pub command_queue: Option<CommandQueue>,
    pub url_opener: Option<UrlOpenerRes>,
}

impl Plugin for OrbitHeadlessPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Fixed timestep: one orbit tick per step
        // ====================================================================
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(ORBIT_DT)));

        // ====================================================================
        // Resources
        // ====================================================================
        app.insert_resource(ActiveScene::default())
            .insert_resource(NodeEntityMap::default())
            .insert_resource(PointerInput::default())
            .insert_resource(self.command_queue.clone().unwrap_or_default())
            .insert_resource(self.url_opener.clone().unwrap_or_default());

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<LoadSceneEvent>()
            .add_message::<ClearSceneEvent>()
            .add_message::<SceneLoadedEvent>()
            .add_message::<PointerInputEvent>()
            .add_message::<NavigateEvent>()
            .add_message::<DragStartedEvent>()
            .add_message::<DragEndedEvent>()
            .add_message::<AssetFailedEvent>()
            .add_message::<BodyDroppedEvent>();

        // ====================================================================
        // Systems
        // ====================================================================
        app.configure_sets(
            Update,
            (OrbitSet::Commands, OrbitSet::Interaction, OrbitSet::Sync).chain(),
        );

        app.add_systems(FixedUpdate, systems::advance_orbits);

        app.add_systems(
            Update,
            (
                systems::process_commands,
                systems::handle_clear_scene,
                systems::handle_load_scene,
            )
                .chain()
                .in_set(OrbitSet::Commands),
        );

        app.add_systems(
            Update,
            (
                systems::sync_viewport,
                systems::route_pointer_input,
                systems::handle_asset_failures,
            )
                .chain()
                .in_set(OrbitSet::Interaction),
        );

        app.add_systems(Update, systems::sync_node_transforms.in_set(OrbitSet::Sync));

        // WASM exit system
        #[cfg(all(target_arch = "wasm32", feature = "windowed"))]
        app.add_systems(Update, crate::bevy::wasm_entry::check_exit_system);
    }
}

// ============================================================================
// Scene Plugin (headless + input capture + rendering)
// ============================================================================

/// Full plugin for a windowed app.
///
/// Includes `OrbitHeadlessPlugin` for all scene logic, plus systems that
/// require `Window`, `Touches`, `AssetServer`, meshes and `Camera3d`.
#[derive(Default)]
pub struct OrbitScenePlugin {
    pub command_queue: Option<CommandQueue>,
    pub url_opener: Option<UrlOpenerRes>,
}

impl OrbitScenePlugin {
    pub fn new(command_queue: CommandQueue, url_opener: UrlOpenerRes) -> Self {
        Self {
            command_queue: Some(command_queue),
            url_opener: Some(url_opener),
        }
    }
}

impl Plugin for OrbitScenePlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Headless logic
        // ====================================================================
        app.add_plugins(OrbitHeadlessPlugin {
            command_queue: self.command_queue.clone(),
            url_opener: self.url_opener.clone(),
        });

        app.init_resource::<systems::RenderStyle>();

        // ====================================================================
        // Input capture (needs Window/Touches), feeds the router
        // ====================================================================
        app.add_systems(
            Update,
            (
                systems::track_window_viewport,
                systems::capture_mouse_input,
                systems::capture_touch_input,
            )
                .chain()
                .after(OrbitSet::Commands)
                .before(OrbitSet::Interaction),
        );

        // ====================================================================
        // Rendering (needs AssetServer/Mesh/Camera3d)
        // ====================================================================
        app.add_systems(Startup, systems::setup_scene_camera);

        app.add_systems(
            Update,
            (systems::apply_scene_camera, systems::attach_body_visuals)
                .after(OrbitSet::Commands),
        );

        app.add_systems(
            Update,
            (systems::watch_asset_loads, systems::apply_drag_highlight)
                .after(OrbitSet::Interaction),
        );
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::bevy::test_utils::TestApp;
    use crate::bevy::{
        AnchorBody, AssetFailedEvent, BodyDroppedEvent, DragEndedEvent, DragStartedEvent, HitProxy,
        NavigateEvent, NodeEntityMap, OrbitNode, SatelliteBody, SceneCommand, SceneLoadedEvent,
    };
    use crate::config::{HitProxyConfig, SatelliteConfig, SceneConfig};
    use crate::interaction::InteractionBehavior;
    use crate::orbit::OrbitSpec;
    use crate::pointer::PointerPhase;

    fn count<F: bevy::ecs::query::QueryFilter>(test: &mut TestApp) -> usize {
        let world = test.world_mut();
        let mut query = world.query_filtered::<Entity, F>();
        query.iter(world).count()
    }

    fn entity_translation(test: &TestApp, entity: Entity) -> Vec3 {
        test.world().get::<Transform>(entity).unwrap().translation
    }

    #[test]
    fn test_load_scene_spawns_entities() {
        let mut test = TestApp::new();
        let mut config = SceneConfig::default();
        config.satellites[0].hit_proxy = Some(HitProxyConfig::default());
        test.load_scene(config);

        assert_eq!(count::<With<OrbitNode>>(&mut test), 5);
        assert_eq!(count::<With<AnchorBody>>(&mut test), 1);
        assert_eq!(count::<With<SatelliteBody>>(&mut test), 3);
        assert_eq!(count::<With<HitProxy>>(&mut test), 1);
        assert_eq!(test.world().resource::<NodeEntityMap>().len(), 5);

        let loaded = test.messages::<SceneLoadedEvent>();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].satellites, 3);
    }

    #[test]
    fn test_reload_replaces_previous_scene() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        let mut config = SceneConfig::default();
        config.satellites.truncate(1);
        test.load_scene(config);

        assert_eq!(count::<With<OrbitNode>>(&mut test), 2);
        assert_eq!(test.scene().field().len(), 1);
    }

    #[test]
    fn test_invalid_config_keeps_running_scene() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());

        let mut bad = SceneConfig::default();
        bad.satellites[0].size = -1.0;
        test.load_scene(bad);

        assert_eq!(test.scene().field().len(), 3);
        assert_eq!(count::<With<OrbitNode>>(&mut test), 4);
    }

    #[test]
    fn test_fixed_steps_advance_orbits() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        let red = test.scene().satellites()[0].body;
        let entity = test.world().resource::<NodeEntityMap>().get(red).unwrap();

        test.step_orbits(10);

        let angle = test.scene().field().clock().angle();
        assert!((angle - 0.2).abs() < 1e-4);
        let expected = Vec3::new(2.0 * angle.cos(), 0.0, 2.0 * angle.sin());
        assert!(entity_translation(&test, entity).abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn test_updates_without_fixed_steps_do_not_advance() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        for _ in 0..5 {
            test.update();
        }
        assert_eq!(test.scene().field().clock().angle(), 0.0);
    }

    #[test]
    fn test_mouse_drag_moves_anchor() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        let anchor = test.scene().anchor();
        let entity = test.world().resource::<NodeEntityMap>().get(anchor).unwrap();

        // Window center looks straight at the anchor.
        test.mouse(PointerPhase::Press, 640.0, 360.0);
        let started = test.messages::<DragStartedEvent>();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].entity, Some(entity));
        assert!(test.scene().graph().get(anchor).unwrap().highlighted);

        test.mouse(PointerPhase::Move, 740.0, 360.0);
        assert!(entity_translation(&test, entity).x > 0.5);

        test.mouse(PointerPhase::Release, 740.0, 360.0);
        let ended = test.messages::<DragEndedEvent>();
        assert_eq!(ended.len(), 1);
        assert_eq!(ended[0].node, anchor);
        assert!(!test.scene().graph().get(anchor).unwrap().highlighted);
    }

    #[test]
    fn test_click_on_satellite_navigates() {
        let mut test = TestApp::new();
        let mut config = SceneConfig::default();
        config.satellites = vec![SatelliteConfig {
            name: "probe".into(),
            orbit: OrbitSpec::circular(3.0),
            size: 0.5,
            color: [1.0, 1.0, 1.0],
            texture: None,
            behavior: InteractionBehavior::Navigate {
                url: "https://example.org/probe".into(),
            },
            hit_proxy: None,
        }];
        test.load_scene(config);

        // Pixel column of world x = 3 on the z = 0 plane for a 1280x720 window.
        let half_width = 10.0 * 37.5_f32.to_radians().tan() * (1280.0 / 720.0);
        let x = (3.0 / half_width + 1.0) * 0.5 * 1280.0;
        test.mouse(PointerPhase::Press, x, 360.0);

        let navigated = test.messages::<NavigateEvent>();
        assert_eq!(navigated.len(), 1);
        assert_eq!(navigated[0].url, "https://example.org/probe");
        assert_eq!(*test.opener.opened.lock(), vec!["https://example.org/probe".to_string()]);
        assert!(test.messages::<DragStartedEvent>().is_empty());
    }

    #[test]
    fn test_click_on_empty_space_does_nothing() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        test.mouse(PointerPhase::Press, 10.0, 10.0);
        test.mouse(PointerPhase::Release, 10.0, 10.0);

        assert!(test.messages::<NavigateEvent>().is_empty());
        assert!(test.messages::<DragStartedEvent>().is_empty());
        assert!(test.messages::<DragEndedEvent>().is_empty());
        assert!(test.opener.opened.lock().is_empty());
    }

    #[test]
    fn test_asset_failure_drops_only_that_body() {
        let mut test = TestApp::new();
        let mut config = SceneConfig::default();
        config.satellites[1].hit_proxy = Some(HitProxyConfig::default());
        test.load_scene(config);
        let green = test.scene().satellites()[1].clone();

        test.world_mut().write_message(AssetFailedEvent {
            node: green.body,
            path: "textures/missing.png".into(),
        });
        test.update();

        let dropped = test.messages::<BodyDroppedEvent>();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].removed.len(), 2);
        assert_eq!(count::<With<OrbitNode>>(&mut test), 3);
        assert_eq!(test.scene().field().len(), 2);

        // The rest keeps orbiting.
        test.step_orbits(3);
        assert!(test.scene().field().clock().angle() > 0.0);
    }

    #[test]
    fn test_clear_scene() {
        let mut test = TestApp::new();
        test.load_scene(SceneConfig::default());
        test.push_command(SceneCommand::ClearScene);
        test.update();

        assert_eq!(count::<With<OrbitNode>>(&mut test), 0);
        assert!(test.world().resource::<NodeEntityMap>().is_empty());
        assert!(!test.world().resource::<crate::bevy::ActiveScene>().is_loaded());
    }

    #[test]
    fn test_yield_splits_commands_across_frames() {
        let mut test = TestApp::new();
        test.push_command(SceneCommand::LoadScene {
            config: SceneConfig::default(),
        });
        test.push_command(SceneCommand::Yield);
        test.push_command(SceneCommand::ClearScene);

        test.update();
        assert!(test.world().resource::<crate::bevy::ActiveScene>().is_loaded());
        test.update();
        assert!(!test.world().resource::<crate::bevy::ActiveScene>().is_loaded());
    }
}
