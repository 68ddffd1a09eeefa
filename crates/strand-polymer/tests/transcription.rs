//! Integration test: a polymerase transcribing a genome by hand.
//!
//! Drives the polymer API the way the engine does: bind at a promoter,
//! step the element, forward its trailing edge to the transcript mask, and
//! release the transcript when the polymerase leaves.

use strand_core::{PolymerId, SimRng, SpeciesRegistry};
use strand_polymer::{
    rnase_site_name, Blocker, MoveOutcome, Polymer, PolymerError, PolymeraseTemplate, RIBOSOME, RNASE,
};
use strand_test_utils::{bare_polymer, phage_genome, registry_with, POLYMERASE};

#[test]
fn transcript_reveals_sites_behind_polymerase() {
    let mut registry = SpeciesRegistry::new();
    let mut rng = SimRng::new(21);
    let mut genome = phage_genome(0.0).build().unwrap();
    genome.initialize(PolymerId(0), &mut registry).unwrap();
    assert_eq!(registry.count("phi1"), 1);

    let rnapol = PolymeraseTemplate::new("rnapol", 10, 40.0);
    let outcome = genome
        .bind(rnapol.instantiate(0.into()), "phi1", &mut registry, &mut rng)
        .unwrap();
    let mut transcript = outcome.transcript.unwrap();
    transcript.initialize(PolymerId(1), &mut registry).unwrap();
    assert!(genome.set_attached(outcome.element, PolymerId(1)));
    assert_eq!(registry.count("phi1"), 0);
    assert_eq!(registry.count("proteinX_rbs"), 0);

    let mut position = None;
    for _ in 0..400 {
        match genome.execute(&mut registry, &mut rng).unwrap() {
            MoveOutcome::Advanced {
                attached: Some(id),
                trailing_edge,
                ..
            } => {
                assert_eq!(id, PolymerId(1));
                transcript.advance_mask_to(trailing_edge, &mut registry).unwrap();
            }
            MoveOutcome::Terminated(t) => {
                assert_eq!(t.attached, Some(PolymerId(1)));
                assert_eq!(t.species, "rnapol");
                transcript.advance_mask_to(t.position, &mut registry).unwrap();
                position = Some(t.position);
                break;
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(position, Some(275));
    assert!(genome.table().is_empty());
    assert_eq!(registry.count("phi1"), 1);
    assert_eq!(transcript.mask().start(), 275);
    assert_eq!(registry.count("proteinX_rbs"), 1);
    assert_eq!(registry.count("proteinY_rbs"), 1);
}

#[test]
fn ribosome_stalls_at_transcript_mask() {
    let mut registry = SpeciesRegistry::new();
    let mut rng = SimRng::new(5);
    let genome = phage_genome(0.0).build().unwrap();
    let strand_polymer::SynthesisPolicy::Genome(template) = genome.policy() else {
        panic!("genome policy expected");
    };
    let mut transcript = template.build_transcript(1).unwrap();
    transcript.initialize(PolymerId(1), &mut registry).unwrap();
    transcript.advance_mask_to(100, &mut registry).unwrap();

    let ribosome = PolymeraseTemplate::new(RIBOSOME, 10, 30.0).instantiate(7.into());
    transcript
        .bind(ribosome, "proteinX_rbs", &mut registry, &mut rng)
        .unwrap();
    let mut blocked = false;
    for _ in 0..20 {
        if let MoveOutcome::Blocked { by, .. } = transcript.execute(&mut registry, &mut rng).unwrap() {
            assert_eq!(by, Blocker::Mask);
            blocked = true;
            break;
        }
    }
    assert!(blocked);
    let element = transcript.elements().next().unwrap();
    assert_eq!(element.stop(), 100);
}

#[test]
fn non_interacting_species_cannot_bind() {
    let mut registry = SpeciesRegistry::new();
    let mut rng = SimRng::new(1);
    let mut polymer = bare_polymer();
    polymer.initialize(PolymerId(0), &mut registry).unwrap();
    let stranger = PolymeraseTemplate::new("other", 10, 1.0).instantiate(0.into());
    assert!(polymer.bind(stranger, "p1", &mut registry, &mut rng).is_err());
    assert_eq!(registry.count("p1"), 1);

    let rnap = PolymeraseTemplate::new(POLYMERASE, 10, 1.0).instantiate(1.into());
    polymer.bind(rnap, "p1", &mut registry, &mut rng).unwrap();
    assert_eq!(registry.count("p1"), 0);
}

/// Step the lone polymerase on `genome` until its trailing edge reaches
/// `edge` or it terminates, pulling the transcript mask behind it.
fn transcribe_to(
    genome: &mut Polymer,
    transcript: &mut Polymer,
    registry: &mut SpeciesRegistry,
    rng: &mut SimRng,
    edge: u32,
) {
    for _ in 0..400 {
        match genome.execute(registry, rng).unwrap() {
            MoveOutcome::Advanced { trailing_edge, .. } => {
                transcript.advance_mask_to(trailing_edge, registry).unwrap();
                if trailing_edge >= edge {
                    return;
                }
            }
            MoveOutcome::Terminated(t) => {
                transcript.advance_mask_to(t.position, registry).unwrap();
                return;
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}

#[test]
fn rnase_chasing_polymerase_leaves_nothing_to_translate() {
    let mut registry = registry_with(&[("rnapol", 1), (RIBOSOME, 1)]);
    let mut rng = SimRng::new(13);
    let phage = phage_genome(1.0);
    let site = rnase_site_name("phage");
    let mut genome = phage.build().unwrap();
    genome.initialize(PolymerId(0), &mut registry).unwrap();
    let rnapol = PolymeraseTemplate::new("rnapol", 10, 40.0);
    let outcome = genome
        .bind(rnapol.instantiate(0.into()), "phi1", &mut registry, &mut rng)
        .unwrap();
    let mut transcript = outcome.transcript.unwrap();
    transcript.initialize(PolymerId(1), &mut registry).unwrap();

    transcribe_to(&mut genome, &mut transcript, &mut registry, &mut rng, 100);
    assert_eq!(registry.count(&site), 1);
    assert_eq!(registry.count("proteinX_rbs"), 1);
    assert_eq!(registry.count("proteinY_rbs"), 0);

    let rnase = phage.rnase_template().instantiate(1.into());
    transcript.bind(rnase, &site, &mut registry, &mut rng).unwrap();
    assert_eq!(registry.count(&site), 0);

    // 60 steps put the RNase's leading edge on proteinX's RBS
    for _ in 0..60 {
        transcript.execute(&mut registry, &mut rng).unwrap();
    }
    assert_eq!(registry.count("proteinX_rbs"), 0);
    let ribosome = PolymeraseTemplate::new(RIBOSOME, 10, 30.0);
    assert!(matches!(
        transcript.bind(ribosome.instantiate(2.into()), "proteinX_rbs", &mut registry, &mut rng),
        Err(PolymerError::NoAvailableSite { .. })
    ));
    assert!(!transcript.is_degraded());

    // it catches up with the mask at 100 and gives up on the rest
    let mut released = None;
    for _ in 0..40 {
        if let MoveOutcome::Terminated(t) = transcript.execute(&mut registry, &mut rng).unwrap() {
            released = Some(t);
            break;
        }
    }
    let released = released.expect("RNase detaches at the mask");
    assert_eq!(released.species, RNASE);
    assert_eq!(released.position, 100);
    assert!(transcript.is_degraded());
    assert!(transcript.table().is_empty());

    transcribe_to(&mut genome, &mut transcript, &mut registry, &mut rng, u32::MAX);
    assert_eq!(transcript.mask().start(), 275);
    assert_eq!(transcript.uncovered("proteinY_rbs"), 0);
    assert_eq!(registry.count("proteinY_rbs"), 0);
    assert!(transcript
        .bind(ribosome.instantiate(3.into()), "proteinY_rbs", &mut registry, &mut rng)
        .is_err());

    // free pools belong to the driver
    assert_eq!(registry.count("rnapol"), 1);
    assert_eq!(registry.count(RIBOSOME), 1);
}
