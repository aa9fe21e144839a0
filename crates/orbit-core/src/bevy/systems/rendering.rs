//! Rendering systems for the orbit scene.
//!
//! Attaches meshes, materials and glTF scenes to the body entities spawned by
//! the scene loader, drives the camera from the scene config, and reflects
//! drag highlight as material emissive.

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::bevy::{
    ActiveScene, AssetFailedEvent, AssetWatch, BodyVisual, DragEndedEvent, DragStartedEvent,
    MainCamera, OrbitNode, SceneLoadedEvent,
};
use crate::pick::PerspectiveRig;

/// Look of the scene: lights, highlight color and mesh resolution.
#[derive(Resource)]
pub struct RenderStyle {
    /// Emissive applied to a dragged body's materials.
    pub highlight_emissive: Color,
    pub ambient_color: Color,
    pub ambient_brightness: f32,
    pub directional_illuminance: f32,
    /// Sectors and stacks of satellite spheres.
    pub sphere_resolution: u32,
    /// Transparent by default so the page shows through the canvas.
    pub clear_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            highlight_emissive: Color::srgb_u8(0xaa, 0xaa, 0xaa),
            ambient_color: Color::srgb_u8(0x40, 0x40, 0x40),
            ambient_brightness: 400.0,
            directional_illuminance: 2_000.0,
            sphere_resolution: 32,
            clear_color: Color::NONE,
        }
    }
}

/// System to spawn the camera and lights once.
pub fn setup_scene_camera(mut commands: Commands, style: Res<RenderStyle>) {
    commands.insert_resource(ClearColor(style.clear_color));

    let rig = PerspectiveRig::default();
    commands.spawn((
        Camera3d::default(),
        MainCamera,
        Projection::Perspective(PerspectiveProjection {
            fov: rig.fov_y,
            near: rig.near,
            far: rig.far,
            ..default()
        }),
        rig.transform(),
        AmbientLight {
            color: style.ambient_color,
            brightness: style.ambient_brightness,
            ..default()
        },
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: style.directional_illuminance,
            ..default()
        },
        // Straight down, as if from above the anchor.
        Transform::from_xyz(0.0, 1.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

/// System to move the camera to the loaded scene's viewpoint.
pub fn apply_scene_camera(
    mut events: MessageReader<SceneLoadedEvent>,
    active: Res<ActiveScene>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
) {
    if events.read().last().is_none() {
        return;
    }
    let Some(scene) = active.get() else {
        return;
    };
    let rig = scene.rig();
    for (mut transform, mut projection) in &mut cameras {
        *transform = rig.transform();
        *projection = Projection::Perspective(PerspectiveProjection {
            fov: rig.fov_y,
            near: rig.near,
            far: rig.far,
            ..default()
        });
    }
}

/// System to attach meshes and scenes to newly spawned bodies.
pub fn attach_body_visuals(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    style: Res<RenderStyle>,
    bodies: Query<(Entity, &BodyVisual), Added<BodyVisual>>,
) {
    for (entity, visual) in &bodies {
        match visual {
            BodyVisual::Model { path } => {
                let handle: Handle<Scene> = asset_server.load(path.clone());
                commands.entity(entity).insert((
                    SceneRoot(handle.clone()),
                    AssetWatch {
                        handle: handle.untyped(),
                        path: path.clone(),
                    },
                ));
            }
            BodyVisual::Cube { half_extents } => {
                commands.entity(entity).insert((
                    Mesh3d(meshes.add(Cuboid::from_size(*half_extents * 2.0))),
                    MeshMaterial3d(materials.add(StandardMaterial::default())),
                ));
            }
            BodyVisual::Sphere {
                radius,
                color,
                texture,
            } => {
                let texture_handle: Option<Handle<Image>> =
                    texture.as_ref().map(|path| asset_server.load(path.clone()));
                let material = StandardMaterial {
                    base_color: *color,
                    base_color_texture: texture_handle.clone(),
                    alpha_mode: if color.alpha() < 1.0 {
                        AlphaMode::Blend
                    } else {
                        AlphaMode::Opaque
                    },
                    unlit: true,
                    ..default()
                };
                let mesh = Sphere::new(*radius)
                    .mesh()
                    .uv(style.sphere_resolution, style.sphere_resolution);
                let mut entity_commands = commands.entity(entity);
                entity_commands.insert((
                    Mesh3d(meshes.add(mesh)),
                    MeshMaterial3d(materials.add(material)),
                ));
                if let (Some(handle), Some(path)) = (texture_handle, texture) {
                    entity_commands.insert(AssetWatch {
                        handle: handle.untyped(),
                        path: path.clone(),
                    });
                }
            }
        }
    }
}

/// System to report bodies whose assets failed to load.
pub fn watch_asset_loads(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    watched: Query<(Entity, &OrbitNode, &AssetWatch)>,
    mut failed: MessageWriter<AssetFailedEvent>,
) {
    for (entity, orbit_node, watch) in &watched {
        match asset_server.get_load_state(watch.handle.id()) {
            Some(LoadState::Failed(err)) => {
                tracing::warn!("[assets] '{}' failed: {}", watch.path, err);
                commands.entity(entity).remove::<AssetWatch>();
                failed.write(AssetFailedEvent {
                    node: orbit_node.node,
                    path: watch.path.clone(),
                });
            }
            Some(LoadState::Loaded) => {
                tracing::debug!("[assets] '{}' loaded", watch.path);
                commands.entity(entity).remove::<AssetWatch>();
            }
            _ => {}
        }
    }
}

/// System to light up dragged bodies and restore them on release.
pub fn apply_drag_highlight(
    mut started: MessageReader<DragStartedEvent>,
    mut ended: MessageReader<DragEndedEvent>,
    style: Res<RenderStyle>,
    children: Query<&Children>,
    material_handles: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let highlight = style.highlight_emissive.to_linear();
    let mut set_emissive = |root: Entity, emissive: LinearRgba| {
        for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
            let Ok(handle) = material_handles.get(entity) else {
                continue;
            };
            if let Some(material) = materials.get_mut(&handle.0) {
                material.emissive = emissive;
            }
        }
    };

    // Ends first so a replaced drag is cleared before the new one lights up.
    for event in ended.read() {
        if let Some(entity) = event.entity {
            set_emissive(entity, LinearRgba::BLACK);
        }
    }
    for event in started.read() {
        if let Some(entity) = event.entity {
            set_emissive(entity, highlight);
        }
    }
}
