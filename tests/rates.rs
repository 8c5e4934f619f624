use approx::assert_abs_diff_eq;
use ndarray as nd;
use rand::{ Rng, SeedableRng, rngs::StdRng };
use ion_rates::{
    rates::{ check_conservation, column_sums },
    species::{ ca40, ca43 },
    Ion,
    IonParams,
    Laser,
    LeakPolicy,
    LevelStructure,
    RateError,
    Rates,
};

const INTENSITIES: [f64; 8] = [1e-3, 1e-1, 0.3, 1.0, 1.0, 2.0, 10.0, 1.2e4];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ca-43 restricted to the 393 nm cycling transition's levels, with the
/// indices of the stretched states `|S, F=4, M=4>` and `|P3/2, F=5, M=5>`.
fn two_level() -> (Ion, usize, usize) {
    let ion = Ion::new(
        ca43::species().unwrap(),
        IonParams::new(5e-4).with_level_filter([ca43::GROUND_LEVEL, ca43::P32]),
    )
    .unwrap();
    let s = ion.index(ca43::GROUND_LEVEL, 4.0).unwrap();
    let p = ion.index(ca43::P32, 5.0).unwrap();
    (ion, s, p)
}

fn full_ion() -> Ion {
    Ion::new(ca43::species().unwrap(), IonParams::new(146e-4)).unwrap()
}

fn steady_state_population(intensity: f64) -> f64 {
    intensity / (2.0 * intensity + 1.0)
}

/// Net rates of change of both populations of the cycling pair, each
/// normalized by its total coupling.
fn normalized_flows(trans: &nd::Array2<f64>, s: usize, p: usize, np: f64)
    -> (f64, f64)
{
    let dnp
        = (trans[[p, p]] * np + trans[[p, s]] * (1.0 - np))
        / (trans[[p, p]] + trans[[p, s]]);
    let dns
        = (trans[[s, p]] * np + trans[[s, s]] * (1.0 - np))
        / (trans[[s, p]] + trans[[s, s]]);
    (dnp, dns)
}

#[test]
fn cycling_pair_loses_population_only_to_itself() {
    init_logging();
    let (ion, s, p) = two_level();
    let rates = Rates::new(&ion);
    let delta = ion.delta(s, p).unwrap();
    let spont = rates.get_spont().unwrap();
    for intensity in INTENSITIES {
        let trans
            = rates.get_transitions(&[Laser::new("393", 1, intensity, delta)])
            .unwrap();
        let r = spont[[p, p]] / (trans[[p, p]] + trans[[p, s]]);
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-7);
    }
}

#[test]
fn steady_state_follows_intensity() {
    init_logging();
    let (ion, s, p) = two_level();
    let rates = Rates::new(&ion);
    let delta = ion.delta(s, p).unwrap();
    for intensity in INTENSITIES {
        let trans
            = rates.get_transitions(&[Laser::new("393", 1, intensity, delta)])
            .unwrap();
        let np = steady_state_population(intensity);
        let (dnp, dns) = normalized_flows(&trans, s, p, np);
        assert_abs_diff_eq!(dnp, 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(dns, 0.0, epsilon = 1e-7);
    }
}

#[test]
fn steady_state_follows_detuning() {
    init_logging();
    let (ion, s, p) = two_level();
    let rates = Rates::new(&ion);
    let delta = ion.delta(s, p).unwrap();
    let resonant = Laser::new("393", 1, 1.0, delta);
    let trans = rates.get_transitions(&[resonant.clone()]).unwrap();
    let line_width = (trans[[p, p]] + trans[[p, s]]).abs();
    for det in [-1e4, 2.3e1, 2.0, -4.0, 0.5, 0.0] {
        let laser = resonant.with_delta(delta + line_width * det);
        let trans = rates.get_transitions(&[laser]).unwrap();
        let np = steady_state_population(1.0 / (4.0 * det * det + 1.0));
        let (dnp, dns) = normalized_flows(&trans, s, p, np);
        assert_abs_diff_eq!(dnp, 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(dns, 0.0, epsilon = 1e-7);
    }
}

#[test]
fn laser_contributions_add() {
    init_logging();
    let ion = full_ion();
    let rates = Rates::new(&ion);
    let spont = rates.get_spont().unwrap();
    let configs = [
        // lasers on two transitions
        [Laser::new("397", 0, 1.0, 0.0), Laser::new("866", 0, 1.0, 0.0)],
        // two lasers on one transition
        [Laser::new("397", 0, 1.0, 0.0), Laser::new("397", 1, 1.0, 0.0)],
    ];
    for [a, b] in configs {
        let both = rates.get_transitions(&[a.clone(), b.clone()]).unwrap();
        let sum
            = &spont
            + &rates.get_stimulated(&[a]).unwrap()
            + &rates.get_stimulated(&[b]).unwrap();
        let scale = spont.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        for (x, y) in both.iter().zip(sum.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12 * scale);
        }
        check_conservation(&both, 1e-9).unwrap();
    }
}

#[test]
fn empty_laser_set_gives_spontaneous_matrix() {
    let ion = full_ion();
    let rates = Rates::new(&ion);
    assert_eq!(rates.get_transitions(&[]).unwrap(), rates.get_spont().unwrap());
    let off = rates.get_transitions(&[Laser::new("397", 0, 0.0, 0.0)]).unwrap();
    assert_eq!(off, rates.get_spont().unwrap());
}

#[test]
fn random_lasers_conserve_population() {
    init_logging();
    let ion = full_ion();
    let rates = Rates::new(&ion).with_leak_policy(LeakPolicy::Renormalize);
    let names: Vec<(&str, i32)>
        = ion.transitions().iter()
        .map(|(name, t)| (name, t.multipole.rank() as i32))
        .collect();
    let mut rng = StdRng::seed_from_u64(10546);
    for _ in 0..20 {
        let lasers: Vec<Laser>
            = (0..rng.gen_range(1..=6))
            .map(|_| {
                let (name, rank) = names[rng.gen_range(0..names.len())];
                Laser::new(
                    name,
                    rng.gen_range(-rank..=rank),
                    10.0_f64.powf(rng.gen_range(-3.0..3.0)),
                    rng.gen_range(-1e9..1e9),
                )
            })
            .collect();
        let trans = rates.get_transitions(&lasers).unwrap();
        check_conservation(&trans, 1e-9).unwrap();
        let sums = column_sums(&trans);
        for (j, sum) in sums.iter().enumerate() {
            assert!(sum.abs() <= 1e-9 * trans[[j, j]].abs().max(1.0));
        }
        for ((i, j), x) in trans.indexed_iter() {
            if i != j {
                assert!(*x >= 0.0);
            }
        }
    }
}

#[test]
fn repeated_builds_are_identical() {
    let lasers = [
        Laser::new("397", 1, 0.7, -2e7),
        Laser::new("866", -1, 3.0, 5e6),
        Laser::new("854", 0, 0.2, 0.0),
    ];
    let a = full_ion();
    let b = full_ion();
    let ta = Rates::new(&a).get_transitions(&lasers).unwrap();
    let tb = Rates::new(&b).get_transitions(&lasers).unwrap();
    assert_eq!(ta, tb);
}

#[test]
fn parallel_builds_match_sequential() {
    let ion = full_ion();
    let rates = Rates::new(&ion);
    let configs: Vec<Vec<Laser>>
        = [-3e8, -1e7, 0.0, 4e7, 2e8].into_iter()
        .map(|delta| vec![
            Laser::new("397", 1, 1.0, delta),
            Laser::new("866", 0, 2.0, 0.0),
        ])
        .collect();
    let many = rates.get_transitions_many(&configs).unwrap();
    assert_eq!(many.len(), configs.len());
    for (m, lasers) in many.iter().zip(configs.iter()) {
        assert_eq!(m, &rates.get_transitions(lasers).unwrap());
    }
}

#[test]
fn bad_lasers_are_rejected() {
    let ion = full_ion();
    let rates = Rates::new(&ion);
    assert!(matches!(
        rates.get_transitions(&[Laser::new("398", 0, 1.0, 0.0)]),
        Err(RateError::UnknownTransition(_)),
    ));
    assert!(matches!(
        rates.get_transitions(&[Laser::new("397", 0, f64::NAN, 0.0)]),
        Err(RateError::Domain(_)),
    ));
    assert!(matches!(
        rates.get_transitions(&[Laser::new("397", 2, 1.0, 0.0)]),
        Err(RateError::Domain(_)),
    ));
    // quadrupole lines accept |q| = 2
    assert!(rates.get_transitions(&[Laser::new("729", 2, 1.0, 0.0)]).is_ok());
    // one bad configuration fails the whole batch
    let configs = vec![
        vec![Laser::new("397", 0, 1.0, 0.0)],
        vec![Laser::new("397", 0, -1.0, 0.0)],
    ];
    assert!(rates.get_transitions_many(&configs).is_err());
}

#[test]
fn lasers_on_inactive_levels_are_ignored() {
    let (ion, _, _) = two_level();
    let rates = Rates::new(&ion);
    let trans = rates.get_transitions(&[Laser::new("397", 0, 1.0, 0.0)]).unwrap();
    assert_eq!(trans, rates.get_spont().unwrap());
}

#[test]
fn even_isotope_resonance() {
    init_logging();
    let ion = Ion::new(ca40::species().unwrap(), IonParams::new(3e-4)).unwrap();
    assert_eq!(ion.num_states(), 2 + 4 + 6 + 2 + 4);
    let rates = Rates::new(&ion);
    let s = ion.index(ca40::S12, -0.5).unwrap();
    let p = ion.index(ca40::P12, 0.5).unwrap();
    let w = ion.line_strength(s, p, 1).unwrap();
    assert_abs_diff_eq!(w, 2.0 / 3.0, epsilon = 1e-12);
    let a = ion.transitions().get("397").unwrap().einstein_a;
    let laser = Laser::new("397", 1, 0.4, ion.delta(s, p).unwrap());
    let trans = rates.get_transitions(&[laser]).unwrap();
    let spont = rates.get_spont().unwrap();
    assert_abs_diff_eq!(
        trans[[p, s]] - spont[[p, s]],
        0.4 * a * w,
        epsilon = 1e-6 * a
    );
    check_conservation(&trans, 1e-9).unwrap();
}
