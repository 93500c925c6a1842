//! Bubble lifecycle: spawn, move, cull
//!
//! Runs at the start of every step, before the grid is rebuilt, so removing
//! bubbles here can never invalidate data the broad or narrow phase is using.

use super::geometry::Aabb;
use super::state::{Bubble, World};

/// Spawn at most one bubble if the cap and cadence allow it.
///
/// Returns true if a bubble was created.
pub fn spawn(world: &mut World) -> bool {
    let params = world.params;
    if world.bubbles.len() >= params.max_population {
        return false;
    }
    if world.sim_time - world.last_spawn_time < params.spawn_interval {
        return false;
    }

    let pos = world.random_point();
    let direction = world.random_direction();
    let id = world.next_bubble_id();
    match Bubble::new(id, pos, params.bubble_radius, direction, world.sim_time) {
        Ok(bubble) => {
            world.bubbles.push(bubble);
            world.last_spawn_time = world.sim_time;
            true
        }
        Err(e) => {
            // Radius and arena were validated at construction
            log::error!("Spawn rejected: {}", e);
            false
        }
    }
}

/// Advance every bubble along its heading
pub fn advance(world: &mut World, dt: f64) {
    let step = world.params.move_speed * dt;
    for bubble in &mut world.bubbles {
        bubble.pos += bubble.direction() * step;
    }
}

/// True if the bubble has left the arena or reached its lifetime at time `now`
#[inline]
pub fn should_cull(arena: &Aabb, bubble: &Bubble, now: f64, lifetime: f64) -> bool {
    !arena.contains_point(bubble.pos) || bubble.age(now) >= lifetime
}

/// Remove every bubble matching the cull predicate.
///
/// The predicate is evaluated against each bubble itself inside a single
/// `retain`, so simultaneous removals cannot shift one another.
/// Returns the number of bubbles removed.
pub fn cull(world: &mut World) -> usize {
    let arena = world.arena;
    let now = world.sim_time;
    let lifetime = world.params.lifetime;
    let before = world.bubbles.len();

    world
        .bubbles
        .retain(|b| !should_cull(&arena, b, now, lifetime));

    let removed = before - world.bubbles.len();
    if removed > 0 {
        log::debug!(
            "Culled {} bubble(s) at t={:.3}, {} remain",
            removed,
            now,
            world.bubbles.len()
        );
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::settings::{GridDimensions, SimConfig};
    use glam::DVec2;

    fn config() -> SimConfig {
        SimConfig {
            arena_offset_x: 0.0,
            arena_offset_y: 0.0,
            arena_width: 100.0,
            arena_height: 100.0,
            bubble_radius: 5.0,
            max_population: 3,
            spawn_interval: 0.0,
            lifetime: 2.0,
            move_speed: 10.0,
            grid: Some(GridDimensions { rows: 2, columns: 2 }),
            seed: Some(99),
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_one_per_call_up_to_cap() -> Result<()> {
        let mut world = World::new(&config())?;
        assert!(spawn(&mut world));
        assert_eq!(world.population(), 1);
        assert!(spawn(&mut world));
        assert!(spawn(&mut world));
        assert!(!spawn(&mut world));
        assert_eq!(world.population(), 3);
        for b in world.bubbles() {
            assert!(world.arena().contains_point(b.pos));
            assert_eq!(b.radius, 5.0);
        }
        Ok(())
    }

    #[test]
    fn test_spawn_respects_interval() -> Result<()> {
        let mut world = World::new(&SimConfig {
            spawn_interval: 1.0,
            ..config()
        })?;
        // last_spawn_time starts at 0
        assert!(!spawn(&mut world));
        world.sim_time = 0.5;
        assert!(!spawn(&mut world));
        world.sim_time = 1.0;
        assert!(spawn(&mut world));
        assert!(!spawn(&mut world));
        world.sim_time = 2.0;
        assert!(spawn(&mut world));
        assert_eq!(world.bubbles()[1].spawn_time, 2.0);
        Ok(())
    }

    #[test]
    fn test_advance_moves_along_direction() -> Result<()> {
        let mut world = World::new(&config())?;
        let id = world.insert_bubble(DVec2::new(50.0, 50.0), DVec2::new(0.0, -1.0))?;
        advance(&mut world, 0.5);
        let pos = world.bubble(id).map(|b| b.pos);
        assert_eq!(pos, Some(DVec2::new(50.0, 45.0)));
        Ok(())
    }

    #[test]
    fn test_cull_out_of_bounds() -> Result<()> {
        let mut world = World::new(&config())?;
        let inside = world.insert_bubble(DVec2::new(50.0, 50.0), DVec2::X)?;
        let outside = world.insert_bubble(DVec2::new(150.0, 50.0), DVec2::X)?;
        let edge = world.insert_bubble(DVec2::new(100.0, 0.0), DVec2::X)?;
        let b = world.bubble(outside).ok_or_else(missing)?;
        assert!(should_cull(world.arena(), b, world.sim_time(), 2.0));
        assert_eq!(cull(&mut world), 1);
        assert!(world.bubble(inside).is_some());
        assert!(world.bubble(edge).is_some());
        assert!(world.bubble(outside).is_none());
        Ok(())
    }

    #[test]
    fn test_cull_expired_at_exact_lifetime() -> Result<()> {
        let mut world = World::new(&config())?;
        let id = world.insert_bubble(DVec2::new(50.0, 50.0), DVec2::X)?;
        world.sim_time = 1.999;
        assert_eq!(cull(&mut world), 0);
        world.sim_time = 2.0;
        assert_eq!(cull(&mut world), 1);
        assert!(world.bubble(id).is_none());
        Ok(())
    }

    #[test]
    fn test_cull_many_at_once_keeps_the_right_ones() -> Result<()> {
        let mut world = World::new(&SimConfig {
            max_population: 6,
            ..config()
        })?;
        let mut keep = Vec::new();
        for i in 0..6 {
            let x = if i % 2 == 0 { -1.0 - i as f64 } else { 10.0 * i as f64 };
            let id = world.insert_bubble(DVec2::new(x, 50.0), DVec2::X)?;
            if i % 2 == 1 {
                keep.push(id);
            }
        }
        assert_eq!(cull(&mut world), 3);
        let left: Vec<_> = world.bubbles().iter().map(|b| b.id).collect();
        assert_eq!(left, keep);
        Ok(())
    }

    fn missing() -> crate::error::Error {
        crate::error::Error::InvalidParam("bubble missing".into())
    }
}
