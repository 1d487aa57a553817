//! Headless перестрелка Coverfire
//!
//! Игрок с камерой у укрытия, два врага на патруле. Печатает состояние раз в секунду.

use bevy::prelude::*;
use coverfire_simulation::ai::{enemy_bundle, NavAgent, PatrolRoute};
use coverfire_simulation::camera::{CameraRig, FollowCamera};
use coverfire_simulation::combat::{CatalogError, Loadout, WeaponCatalog, WeaponId, WeaponResolver};
use coverfire_simulation::cover::CoverPoint;
use coverfire_simulation::physics::ObstacleField;
use coverfire_simulation::player::{player_bundle, player_collaborators};
use coverfire_simulation::{create_headless_app, EnemyState, Health, PlayerInput, PlayerState, StateMachine};

fn main() -> Result<(), CatalogError> {
    let seed = 42;
    println!("Starting Coverfire headless skirmish (seed: {})", seed);

    let mut app = create_headless_app(seed);
    let catalog = WeaponCatalog::builtin();

    app.insert_resource(
        ObstacleField::new().with_wall(Vec3::new(0.0, 0.6, -3.0), Vec3::new(1.5, 0.6, 0.2)),
    );

    let (rifle, loadout) = Loadout::from_catalog(&catalog, &[WeaponId::new("rifle"), WeaponId::new("pistol")])?;
    let player = app
        .world_mut()
        .spawn((player_bundle(rifle), player_collaborators(), loadout, Transform::from_xyz(0.0, 0.0, -1.5)))
        .id();

    let rig = CameraRig::default();
    app.world_mut().spawn((FollowCamera::new(player, &rig), rig));
    app.world_mut()
        .spawn((Transform::from_xyz(0.0, 0.0, -3.0), CoverPoint::default()));

    let enemy_weapon = WeaponResolver::from_catalog(&catalog, &WeaponId::new("enemy_rifle"))?;
    for x in [-6.0, 6.0] {
        let route = PatrolRoute::new(vec![Vec3::new(x, 0.0, -14.0), Vec3::new(x, 0.0, -20.0)]);
        app.world_mut().spawn((
            enemy_bundle(enemy_weapon.clone(), Some(&route)),
            route,
            NavAgent::default(),
            Transform::from_xyz(x, 0.0, -14.0),
        ));
    }

    // Игрок целится вперёд и стреляет, как только враги подходят
    for tick in 0..1280 {
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
            input.aim_held = true;
            input.fire_held = tick % 128 < 64;
        }

        app.update();

        if tick % 64 == 0 {
            let world = app.world_mut();
            let player_state = world
                .get::<StateMachine<PlayerState>>(player)
                .map(|fsm| *fsm.current());
            let player_hp = world.get::<Health>(player).map(|h| h.current);
            let ammo = world.get::<WeaponResolver>(player).map(WeaponResolver::current_ammo);

            let mut enemies = world.query::<(Entity, &StateMachine<EnemyState>, &Health)>();
            let summary: Vec<String> = enemies
                .iter(world)
                .map(|(entity, fsm, health)| format!("{:?}={:?}({})", entity, fsm.current(), health.current))
                .collect();

            println!(
                "Tick {}: player {:?} hp={:?} ammo={:?} | enemies [{}]",
                tick,
                player_state,
                player_hp,
                ammo,
                summary.join(", ")
            );
        }
    }

    println!("Simulation complete!");
    Ok(())
}
