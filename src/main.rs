use bevy::color::palettes::css::{RED, WHITE};
use bevy::prelude::*;
use pd_cloth::{Cloth, ClothParams, ClothPlugin, ClothResult, UniformForce, Vector};

const COLUMNS: usize = 24;
const ROWS: usize = 18;
const SPACING: f64 = 20.0;
const STIFFNESS: f64 = 400.0;
const TICK_HZ: f64 = 60.0;
const GRAVITY: Vector = Vector::new(0.0, -200.0);

fn init(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Draws one point per particle and one segment per spring.
fn draw_cloth(cloth: Res<Cloth>, mut gizmos: Gizmos) {
    let positions: Vec<Vec2> = cloth.positions().map(|position| position.as_vec2()).collect();

    for (a, b) in cloth.spring_segments() {
        gizmos.line_2d(positions[a], positions[b], WHITE);
    }
    for position in &positions {
        gizmos.circle_2d(*position, 2.0, RED);
    }
}

fn main() -> ClothResult<()> {
    let half_width = (COLUMNS - 1) as f64 * SPACING / 2.0;
    let params = ClothParams::new(COLUMNS, ROWS, SPACING, STIFFNESS, 1.0 / TICK_HZ)
        .with_grid_origin(Vector::new(-half_width, 250.0))
        .with_anchors_on_layout()
        .with_damping(0.01);
    let cloth = Cloth::new(&params)?;

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(ClothPlugin)
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
        .insert_resource(cloth)
        .insert_resource(UniformForce(GRAVITY))
        .add_systems(Startup, init)
        .add_systems(Update, draw_cloth)
        .run();

    Ok(())
}
