//! Browser-side smoke tests for the wasm-bindgen surface.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use swarm_physics_wasm::SwarmPhysicsWasm;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn spawn_link_and_step() {
    let mut swarm = SwarmPhysicsWasm::new(800.0, 600.0);
    let file = swarm.spawn_file();
    let person = swarm.spawn_person();
    assert!(swarm.add_contact(person, file, 25.0));

    swarm.step_many(10);

    assert_eq!(swarm.file_count(), 1);
    assert_eq!(swarm.person_count(), 1);
    assert_eq!(swarm.contact_count(), 1);
    assert_eq!(swarm.file_lives()[0], 245);
    assert_eq!(swarm.file_touches()[0], 1);

    let positions = swarm.file_positions();
    assert_eq!(positions.length(), 2);
    let x = positions.get_index(0);
    let y = positions.get_index(1);
    assert!((0.0..=800.0).contains(&x));
    assert!((0.0..=600.0).contains(&y));
}

#[wasm_bindgen_test]
fn configure_from_js_object() {
    let mut swarm = SwarmPhysicsWasm::new(640.0, 480.0);
    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &"seed".into(), &7.0.into()).unwrap();
    js_sys::Reflect::set(&config, &"fileLife".into(), &3.0.into()).unwrap();
    swarm.configure(config.into()).unwrap();

    swarm.spawn_file();
    swarm.step_many(3);
    swarm.sweep();
    assert_eq!(swarm.file_count(), 0);
}

#[wasm_bindgen_test]
fn spatial_picking() {
    let mut swarm = SwarmPhysicsWasm::new(800.0, 600.0);
    let file = swarm.spawn_file();
    swarm.rebuild_spatial_index();

    let hit = swarm.find_nearest(0.0, 0.0).unwrap();
    assert_eq!(hit, vec![0, file]);
    assert_eq!(swarm.find_in_rect(0.0, 0.0, 800.0, 600.0).len(), 2);
}
