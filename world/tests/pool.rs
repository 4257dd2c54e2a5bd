use std::collections::HashSet;

use glam::{Quat, Vec3};
use hound_chase_core::{Category, Fault, InstanceHandle, TemplateId};
use hound_chase_world::{PooledInstancePool, TemplateCatalog};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn preloaded_instances_are_reused_before_allocating() {
    let mut catalog = TemplateCatalog::new();
    let spike = catalog.register("spike", Category::Obstacle, 1.0);
    let mut pool = PooledInstancePool::new(catalog);

    pool.preload(spike, 5);
    assert_eq!(pool.allocations(spike), 5);
    assert_eq!(pool.free_count(), 5);

    let first_wave: Vec<InstanceHandle> = (0..5).map(|_| acquire(&mut pool, spike)).collect();
    assert_eq!(pool.allocations(spike), 5, "preloaded instances cover five acquires");

    for handle in &first_wave[..3] {
        pool.release(*handle).expect("live instance releases");
    }

    let second_wave: Vec<InstanceHandle> = (0..2).map(|_| acquire(&mut pool, spike)).collect();
    assert_eq!(pool.allocations(spike), 5, "released instances are reused");
    for handle in &second_wave {
        assert!(first_wave[..3].contains(handle));
    }

    // Four live; one released instance is still queued.
    let _ = acquire(&mut pool, spike);
    assert_eq!(pool.allocations(spike), 5);
    let _ = acquire(&mut pool, spike);
    let _ = acquire(&mut pool, spike);
    assert_eq!(pool.allocations(spike), 7, "exhausted pool allocates on demand");
    assert_eq!(pool.live_count(), 7);
}

#[test]
fn random_sequences_preserve_membership_invariants() {
    let mut catalog = TemplateCatalog::new();
    let spike = catalog.register("spike", Category::Obstacle, 1.0);
    let trap = catalog.register("trap", Category::Trap, 1.5);
    let templates = [spike, trap];
    let mut pool = PooledInstancePool::new(catalog);
    pool.preload(spike, 3);

    for seed in 0..16_u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_0000 + seed);
        let mut held: Vec<InstanceHandle> = Vec::new();
        let mut previous_total = pool.total_instances();

        for _ in 0..400 {
            let roll: f32 = rng.gen();
            if roll < 0.5 || held.is_empty() {
                let template = templates[rng.gen_range(0..templates.len())];
                held.push(acquire(&mut pool, template));
            } else if roll < 0.9 {
                let index = rng.gen_range(0..held.len());
                let handle = held.swap_remove(index);
                pool.release(handle).expect("held handles are live");
            } else {
                let handle = held[rng.gen_range(0..held.len())];
                let _ = pool.release(handle);
                let outcome = pool.release(handle);
                assert_eq!(outcome, Err(Fault::DoubleRelease(handle)));
                held.retain(|held_handle| *held_handle != handle);
            }

            assert_disjoint(&pool, &templates);
            let total = pool.total_instances();
            assert!(total >= previous_total, "instance count never shrinks");
            previous_total = total;
        }

        for handle in held.drain(..) {
            pool.release(handle).expect("held handles are live");
        }
        assert_eq!(pool.live_count(), 0, "every acquire was paired with a release");
    }
}

fn acquire(pool: &mut PooledInstancePool, template: TemplateId) -> InstanceHandle {
    pool.acquire(template, Vec3::ZERO, Quat::IDENTITY)
        .expect("registered template")
}

fn assert_disjoint(pool: &PooledInstancePool, templates: &[TemplateId]) {
    for template in templates {
        let live: HashSet<InstanceHandle> = pool.live_handles(*template).collect();
        let free: Vec<InstanceHandle> = pool.free_handles(*template).collect();
        let unique_free: HashSet<InstanceHandle> = free.iter().copied().collect();
        assert_eq!(unique_free.len(), free.len(), "free queue holds duplicates");
        assert!(
            live.is_disjoint(&unique_free),
            "instance is both live and free"
        );
        for handle in &live {
            assert!(pool.is_live(*handle));
        }
        for handle in &free {
            assert!(!pool.is_live(*handle));
        }
    }
}
