//! Coverfire Simulation Core
//!
//! Боевое ядро шутера от третьего лица на Bevy 0.16 (ECS, headless).
//!
//! Тик (FixedUpdate, 64Hz):
//! - Sense: hurtbox'ы → укрытия → восприятие врагов
//! - Decide: FSM игрока и врагов (движение, стрельба, перезарядка, укрытие)
//! - Resolve: урон / смерть / тревога от урона
//! - Camera: follow-камера читает флаг прицеливания
//!
//! Рендер, анимации, звук, UI — внешние коллабораторы: ядро отдаёт им
//! события и параметры, но само ничего не рисует.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod camera;
pub mod combat;
pub mod components;
pub mod cover;
pub mod fsm;
pub mod input;
pub mod logger;
pub mod perception;
pub mod physics;
pub mod player;

// Re-export для удобства
pub use ai::{AIPlugin, EnemyConfig, EnemyState, NavAgent, PatrolRoute};
pub use camera::{AimState, CameraPlugin, FollowCamera};
pub use combat::{CombatPlugin, DamageEvent, EntityDied, WeaponCatalog, WeaponId, WeaponResolver, WeaponStats};
pub use components::*;
pub use cover::{CoverPlugin, CoverPoint, CoverRegistry};
pub use fsm::{FsmState, StateMachine};
pub use input::PlayerInput;
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel, LogPrinter};
pub use perception::{Perception, PerceptionConfig, PerceptionPlugin};
pub use player::{PlayerPlugin, PlayerState};

/// Частота симуляции (Hz)
pub const SIMULATION_HZ: f64 = 64.0;

/// Фазы одного тика (chained)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Сбор данных о мире: hurtbox'ы, укрытия, восприятие
    Sense,
    /// FSM акторов
    Decide,
    /// Урон, смерть, деспавн
    Resolve,
    /// Камера (после всех gameplay решений)
    Camera,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Хост мог задать свой seed / частоту заранее
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        if !app.world().contains_resource::<Time<Fixed>>() {
            app.insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Sense,
                SimulationSet::Decide,
                SimulationSet::Resolve,
                SimulationSet::Camera,
            )
                .chain(),
        )
        .add_systems(
            FixedUpdate,
            physics::sync_hurtboxes
                .in_set(SimulationSet::Sense)
                .before(perception::update_perception),
        )
        .add_systems(FixedUpdate, input::release_input_edges.after(SimulationSet::Camera))
        .add_plugins((
            CombatPlugin,
            CoverPlugin,
            PerceptionPlugin,
            PlayerPlugin,
            AIPlugin,
            CameraPlugin,
        ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` (кроме первого, нулевого) = ровно один fixed тик 1/64с.
/// Физика — `ObstacleField` (пустой; тесты добавляют стены сами).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )))
        .insert_resource(physics::ObstacleField::default())
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
