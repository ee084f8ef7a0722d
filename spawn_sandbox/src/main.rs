//! Spawner sandbox
//!
//! Drives an object registry against a simulated host for a fixed number of
//! frames and prints what happened.
//!
//! ```text
//! spawn_sandbox [config.toml | config.ron]
//! ```

mod simulated_host;

use scene_spawner::foundation::logging;
use scene_spawner::foundation::math::utils;
use scene_spawner::prelude::*;
use simulated_host::SimulatedHost;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

const FRAMES: u32 = 600;
const FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Frame at which the simulated engine drops the floating effect on its own
const ENGINE_REMOVAL_FRAME: u32 = 200;

#[derive(Debug, thiserror::Error)]
enum SandboxError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("spawn failed: {0}")]
    Spawn(#[from] SpawnError),
}

fn load_config() -> Result<SpawnerConfig, SandboxError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SpawnerConfig::load_from_file(&path)?,
        None => SpawnerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run() -> Result<(), SandboxError> {
    let config = load_config()?;
    logging::init_with_level(&config.logging.level);
    log::info!("Starting spawner sandbox");

    let host = Rc::new(SimulatedHost::new());
    let clock = Rc::new(ManualClock::new());
    let ctx = HostContext::new(host.clone(), host.clone(), clock.clone(), config.clone());
    let mut registry = ObjectRegistry::new(&ctx);

    let player = ActorRef::new(0x1_4000, Vec3::new(12.0, 0.0, -3.0), 0.0);

    let rock = registry.add(
        "bg/ffxiv/sea_s1/twn/s1t1/bgparts/s1t1_t0_ston1.mdl",
        &TransformPatch::new().with_position(Vec3::new(10.0, 0.0, 0.0)),
        false,
    )?;
    let house = registry.add(
        "bg/ffxiv/sea_s1/hou/s1h1/bgparts/s1h1_house.sgb",
        &TransformPatch::new().with_position(Vec3::new(-5.0, 0.0, 8.0)),
        config.groups.collide_by_default,
    )?;
    let glow = registry.add("vfx/common/eff/cmat_light_w.avfx", &TransformPatch::new(), false)?;
    let hit = registry.add_on_actor(
        "vfx/common/eff/dk05th_stdn0t.avfx",
        player,
        ActorSpawnOptions::from_config(&config).with_collide(false),
    )?;
    let aura = registry.add_on_actor(
        "vfx/common/eff/m0328_sph_loop.avfx",
        player,
        ActorSpawnOptions::new(Duration::from_secs(2), true),
    )?;
    log::info!("Spawned rock {rock:?}, house {house:?}, glow {glow:?}, hit {hit:?}, aura {aura:?}");

    // Another thread asks for a mesh; it appears after the next tick
    let remote = registry.remote();
    let reply = thread::spawn(move || {
        remote.spawn(
            "bg/ffxiv/sea_s1/twn/s1t1/bgparts/s1t1_t0_barl1.mdl",
            TransformPatch::new().with_scale(Vec3::new(2.0, 2.0, 2.0)),
            false,
        )
    })
    .join()
    .ok();

    let mut rock_angle = 0.0_f32;

    for frame in 0..FRAMES {
        host.next_frame();
        clock.advance(FRAME_TIME);
        registry.handle_signal(HostSignal::FrameUpdate);

        if frame == 0 {
            match reply.as_ref().map(|reply| reply.try_recv()) {
                Some(Ok(result)) => log::info!("Remote spawn finished: {:?}", result?),
                _ => log::warn!("Remote spawn did not answer"),
            }
            if let Some(group) = registry.get_mut(house).and_then(SpawnedObject::group_mut) {
                group.apply_stain(Vec3::new(0.8, 0.2, 0.2));
                group.set_highlight(config.groups.default_highlight);
                log::info!("House stain index: {}", group.stain_index());
            }
        }

        if frame == ENGINE_REMOVAL_FRAME {
            let addr = registry
                .get(glow)
                .and_then(SpawnedObject::effect)
                .and_then(EffectHandle::native)
                .map(|ptr| ptr.addr());
            if let Some(addr) = addr.filter(|&addr| host.expire_effect(addr)) {
                registry.native_removed(addr);
            }
        }

        if frame % 60 == 0 {
            rock_angle += 0.3;
            registry.set_transform(rock, &TransformPatch::new().with_rotation(utils::yaw(rock_angle)))?;
        }
    }

    let stats = registry.stats().clone();
    println!("frames:          {FRAMES}");
    println!("objects now:     {}", stats.current_objects);
    println!("peak objects:    {}", stats.peak_objects);
    println!("spawned:         {}", stats.total_spawned);
    println!("expired:         {}", stats.total_expired);
    println!("refreshed:       {}", stats.total_refreshed);
    println!("native objects:  {}", host.live_objects());

    registry.handle_signal(HostSignal::ZoneChanged);
    registry.dispose();
    println!("after teardown:  {} native objects, subscribed: {}", host.live_objects(), host.has_subscribers());

    log::info!("Spawner sandbox finished");
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        log::error!("Sandbox failed: {error}");
        eprintln!("{error}");
        std::process::exit(1);
    }
}
