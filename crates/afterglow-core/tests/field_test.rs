use afterglow_core::DecayField;

fn nonzero_cells(field: &DecayField) -> usize {
    field.cells().iter().filter(|c| **c > 0.0).count()
}

// ── Empty field ─────────────────────────────────────────────────────────

#[test]
fn ticking_empty_field_stays_zero() {
    let mut field = DecayField::new(16, 0.2, 10).unwrap();
    field.tick();
    assert!(field.cells().iter().all(|c| *c == 0.0));
    field.tick();
    assert!(field.cells().iter().all(|c| *c == 0.0));
}

// ── End-to-end decay on a tiny grid ─────────────────────────────────────

#[test]
fn sample_lights_then_expires() {
    let mut field = DecayField::new(4, 0.1, 2).unwrap();
    assert!(field.record_sample(0.5, 0.5));

    field.tick();
    let first = field.cell(2, 2).unwrap();
    assert!(first > 0.0, "center cell should be lit, got {first}");

    field.tick();
    let second = field.cell(2, 2).unwrap();
    assert!(second < first, "expected decay: {second} >= {first}");

    field.tick();
    assert_eq!(nonzero_cells(&field), 0);
    assert!(field.samples().is_empty());
}

// ── Strength falls every tick and hits zero at max age ──────────────────

#[test]
fn contribution_strictly_decreases_until_expiry() {
    let max_age = 8;
    let mut field = DecayField::new(32, 0.25, max_age).unwrap();
    field.record_sample(0.5, 0.5);

    let mut previous = f32::INFINITY;
    for tick in 1..max_age {
        field.tick();
        let value = field.cell(16, 16).unwrap();
        assert!(value < previous, "tick {tick}: {value} >= {previous}");
        assert!((value - (1.0 - tick as f32 / max_age as f32)).abs() < 1e-6);
        previous = value;
    }

    field.tick();
    assert_eq!(field.cell(16, 16), Some(0.0));
    assert!(field.samples().is_empty());
}

#[test]
fn radius_shrinks_with_age() {
    let mut field = DecayField::new(64, 0.25, 4).unwrap();
    field.record_sample(0.5, 0.5);

    field.tick();
    let wide = nonzero_cells(&field);
    field.tick();
    let narrow = nonzero_cells(&field);
    assert!(narrow < wide, "{narrow} >= {wide}");
}

// ── Max-compositing ─────────────────────────────────────────────────────

#[test]
fn overlapping_samples_take_the_maximum() {
    let mut field = DecayField::new(16, 0.2, 10).unwrap();
    field.record_sample(0.5, 0.5);
    field.tick();
    field.tick();
    let older_alone = field.cell(8, 8).unwrap();

    let mut both = DecayField::new(16, 0.2, 10).unwrap();
    both.record_sample(0.5, 0.5);
    both.tick();
    both.record_sample(0.5, 0.5);
    both.tick();

    // The fresh sample has age 1, strength 0.9; the older one 0.8.
    let combined = both.cell(8, 8).unwrap();
    assert!((combined - 0.9).abs() < 1e-6, "got {combined}");
    assert!(combined > older_alone);
    assert!(combined <= 1.0);
}

#[test]
fn duplicate_samples_do_not_brighten() {
    let mut single = DecayField::new(16, 0.2, 10).unwrap();
    single.record_sample(0.3, 0.3);
    single.tick();

    let mut stacked = DecayField::new(16, 0.2, 10).unwrap();
    for _ in 0..20 {
        stacked.record_sample(0.3, 0.3);
    }
    stacked.tick();

    assert_eq!(single.cells(), stacked.cells());
}

// ── Live reconfiguration ────────────────────────────────────────────────

#[test]
fn shortening_max_age_expires_old_samples() {
    let mut field = DecayField::new(8, 0.1, 10).unwrap();
    field.record_sample(0.5, 0.5);
    field.tick();
    field.tick();
    field.set_decay(0.1, 3).unwrap();
    field.tick();
    assert!(field.samples().is_empty());
    assert_eq!(nonzero_cells(&field), 0);
}

#[test]
fn invalid_decay_parameters_are_rejected() {
    assert!(DecayField::new(0, 0.1, 10).is_err());
    assert!(DecayField::new(8, 0.0, 10).is_err());
    assert!(DecayField::new(8, 0.1, 0).is_err());

    let mut field = DecayField::new(8, 0.1, 10).unwrap();
    assert!(field.set_decay(-1.0, 10).is_err());
    assert_eq!(field.trail_radius(), 0.1);
}
