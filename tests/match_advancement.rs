//! Integration tests for advancement arithmetic, slot writes, and bye resolution.

use bracket_engine::logic::{
    lower_winner_destination, upper_loser_destination, upper_winner_destination,
};
use bracket_engine::{
    advance, build_bracket, resolve_byes, Bracket, EntrantMode, Entry, MatchKey, MatchStatus,
    Participant, SeedingMethod, Slot, Tournament, TournamentError, TournamentFormat,
};
use uuid::Uuid;

fn solo() -> Participant {
    Participant::Solo(Uuid::new_v4())
}

fn tournament(format: TournamentFormat) -> Tournament {
    Tournament::new("Open", format, SeedingMethod::Sequential, EntrantMode::Solo, 64)
}

/// Bracket built straight from slot order (adjacent pairs form round-1 matches).
fn bracket(format: TournamentFormat, slots: &[Option<Participant>]) -> (Tournament, Bracket) {
    let t = tournament(format);
    let seeded: Vec<Option<Entry>> = slots
        .iter()
        .map(|p| p.map(|p| Entry::new(t.id, p)))
        .collect();
    let matches = build_bracket(&t, &seeded).unwrap();
    (t, Bracket::from_matches(matches))
}

fn full(n: usize) -> Vec<Option<Participant>> {
    (0..n).map(|_| Some(solo())).collect()
}

/// Mark the match at `key` completed with `winner` (taken from the given slot).
fn complete(bracket: &mut Bracket, key: MatchKey, winner: Slot) -> Participant {
    let m = bracket.find_mut(key).unwrap();
    let w = m.slot(winner).unwrap();
    m.winner = Some(w);
    m.status = MatchStatus::Completed;
    w
}

#[test]
fn destination_arithmetic() {
    assert_eq!(upper_winner_destination(1, 3), (MatchKey::upper(2, 2), Slot::Home));
    assert_eq!(upper_winner_destination(2, 2), (MatchKey::upper(3, 1), Slot::Away));
    assert_eq!(upper_loser_destination(1, 4), (MatchKey::lower(1, 2), Slot::Away));
    assert_eq!(upper_loser_destination(1, 1), (MatchKey::lower(1, 1), Slot::Home));
    assert_eq!(upper_loser_destination(3, 1), (MatchKey::lower(4, 1), Slot::Away));
    assert_eq!(lower_winner_destination(1, 2), (MatchKey::lower(2, 2), Slot::Home));
    assert_eq!(lower_winner_destination(2, 2), (MatchKey::lower(3, 1), Slot::Away));
    assert_eq!(lower_winner_destination(4, 3), (MatchKey::lower(5, 2), Slot::Home));
}

#[test]
fn upper_winner_moves_to_next_round_by_parity() {
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &full(8));
    let w3 = complete(&mut b, MatchKey::upper(1, 3), Slot::Away);
    let w4 = complete(&mut b, MatchKey::upper(1, 4), Slot::Home);

    let first = advance(&mut b, t.format, MatchKey::upper(1, 3)).unwrap();
    let second = advance(&mut b, t.format, MatchKey::upper(1, 4)).unwrap();
    assert!(first.conflicts.is_empty() && second.conflicts.is_empty());

    let next = b.find(MatchKey::upper(2, 2)).unwrap();
    assert_eq!(next.home, Some(w3));
    assert_eq!(next.away, Some(w4));
    assert!(!first.tournament_completed);
}

#[test]
fn single_elimination_final_completes_tournament() {
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &full(2));
    let w = complete(&mut b, MatchKey::upper(1, 1), Slot::Home);
    let outcome = advance(&mut b, t.format, MatchKey::upper(1, 1)).unwrap();
    assert!(outcome.tournament_completed);
    assert_eq!(outcome.champion, Some(w));
    assert!(outcome.placements.is_empty());
}

#[test]
fn round_one_loser_drops_to_lower_round_one() {
    let (t, mut b) = bracket(TournamentFormat::DoubleElimination, &full(8));
    for position in 1..=4 {
        complete(&mut b, MatchKey::upper(1, position), Slot::Home);
        advance(&mut b, t.format, MatchKey::upper(1, position)).unwrap();
    }
    for position in 1..=4u32 {
        let loser = b.find(MatchKey::upper(1, position)).unwrap().away.unwrap();
        let lower = b.find(MatchKey::lower(1, position.div_ceil(2))).unwrap();
        let expected = if position % 2 == 1 { lower.home } else { lower.away };
        assert_eq!(expected, Some(loser));
    }
}

#[test]
fn later_round_loser_takes_away_slot() {
    let (t, mut b) = bracket(TournamentFormat::DoubleElimination, &full(8));
    for position in 1..=4 {
        complete(&mut b, MatchKey::upper(1, position), Slot::Home);
        advance(&mut b, t.format, MatchKey::upper(1, position)).unwrap();
    }
    complete(&mut b, MatchKey::upper(2, 2), Slot::Home);
    let outcome = advance(&mut b, t.format, MatchKey::upper(2, 2)).unwrap();

    let loser = b.find(MatchKey::upper(2, 2)).unwrap().away.unwrap();
    let drop = b.find(MatchKey::lower(2, 2)).unwrap();
    assert_eq!(drop.away, Some(loser));
    assert_eq!(drop.home, None);
    assert_eq!(outcome.placements.len(), 2);
}

#[test]
fn lower_bracket_routing_odd_and_even_rounds() {
    let (t, mut b) = bracket(TournamentFormat::DoubleElimination, &full(8));
    for position in 1..=4 {
        complete(&mut b, MatchKey::upper(1, position), Slot::Home);
        advance(&mut b, t.format, MatchKey::upper(1, position)).unwrap();
    }

    // Odd lower round: keep position, take HOME.
    let w = complete(&mut b, MatchKey::lower(1, 2), Slot::Away);
    advance(&mut b, t.format, MatchKey::lower(1, 2)).unwrap();
    assert_eq!(b.find(MatchKey::lower(2, 2)).unwrap().home, Some(w));

    // Fill the reserved AWAY slot and play the even round: consolidate to ceil(p/2).
    b.find_mut(MatchKey::lower(2, 2)).unwrap().away = Some(solo());
    let w = complete(&mut b, MatchKey::lower(2, 2), Slot::Home);
    advance(&mut b, t.format, MatchKey::lower(2, 2)).unwrap();
    assert_eq!(b.find(MatchKey::lower(3, 1)).unwrap().away, Some(w));
}

#[test]
fn grand_final_gets_upper_home_and_lower_away() {
    let (t, mut b) = bracket(TournamentFormat::DoubleElimination, &full(4));
    let s1 = complete(&mut b, MatchKey::upper(1, 1), Slot::Home);
    advance(&mut b, t.format, MatchKey::upper(1, 1)).unwrap();
    complete(&mut b, MatchKey::upper(1, 2), Slot::Home);
    advance(&mut b, t.format, MatchKey::upper(1, 2)).unwrap();

    let l1 = complete(&mut b, MatchKey::lower(1, 1), Slot::Home);
    advance(&mut b, t.format, MatchKey::lower(1, 1)).unwrap();
    complete(&mut b, MatchKey::upper(2, 1), Slot::Home);
    advance(&mut b, t.format, MatchKey::upper(2, 1)).unwrap();
    let l2 = b.find(MatchKey::lower(2, 1)).unwrap();
    assert_eq!(l2.home, Some(l1));

    complete(&mut b, MatchKey::lower(2, 1), Slot::Home);
    advance(&mut b, t.format, MatchKey::lower(2, 1)).unwrap();

    let gf = b.find(MatchKey::grand_final()).unwrap();
    assert_eq!(gf.home, Some(s1));
    assert_eq!(gf.away, Some(l1));

    let champ = complete(&mut b, MatchKey::grand_final(), Slot::Away);
    let outcome = advance(&mut b, t.format, MatchKey::grand_final()).unwrap();
    assert!(outcome.tournament_completed);
    assert_eq!(outcome.champion, Some(champ));
}

#[test]
fn occupied_slot_falls_back_then_conflicts() {
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &full(4));
    let squatter = solo();
    b.find_mut(MatchKey::upper(2, 1)).unwrap().home = Some(squatter);

    let w = complete(&mut b, MatchKey::upper(1, 1), Slot::Home);
    let outcome = advance(&mut b, t.format, MatchKey::upper(1, 1)).unwrap();
    let next = b.find(MatchKey::upper(2, 1)).unwrap();
    assert_eq!(next.home, Some(squatter));
    assert_eq!(next.away, Some(w));
    assert_eq!(outcome.placements[0].slot, Slot::Away);

    // Processing the same result again must not overwrite anything.
    let again = advance(&mut b, t.format, MatchKey::upper(1, 1)).unwrap();
    assert_eq!(again.conflicts, vec![MatchKey::upper(2, 1)]);
    assert!(again.placements.is_empty());
    let next = b.find(MatchKey::upper(2, 1)).unwrap();
    assert_eq!((next.home, next.away), (Some(squatter), Some(w)));
}

#[test]
fn winner_must_have_played() {
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &full(4));
    let stranger = solo();
    {
        let m = b.find_mut(MatchKey::upper(1, 1)).unwrap();
        m.winner = Some(stranger);
        m.status = MatchStatus::Completed;
    }
    assert_eq!(
        advance(&mut b, t.format, MatchKey::upper(1, 1)),
        Err(TournamentError::InvalidWinner(stranger.id()))
    );
}

#[test]
fn round_robin_matches_do_not_route() {
    let (t, mut b) = bracket(TournamentFormat::RoundRobin, &full(4));
    complete(&mut b, MatchKey::upper(1, 1), Slot::Home);
    let outcome = advance(&mut b, t.format, MatchKey::upper(1, 1)).unwrap();
    assert!(outcome.placements.is_empty());
    assert!(!outcome.tournament_completed);
}

#[test]
fn byes_resolve_in_a_single_pass() {
    let a = solo();
    let c = solo();
    let slots = vec![Some(a), None, None, None, Some(c), None, None, None];
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &slots);

    let outcome = resolve_byes(&mut b, t.format).unwrap();
    assert_eq!(outcome.placements.len(), 2);

    let r1 = b.find(MatchKey::upper(1, 1)).unwrap();
    assert_eq!(r1.status, MatchStatus::Completed);
    assert_eq!(r1.winner, Some(a));
    // Empty match is not a bye.
    assert_eq!(b.find(MatchKey::upper(1, 2)).unwrap().status, MatchStatus::Pending);

    // Round-2 matches become one-sided but are not resolved again.
    let r2_1 = b.find(MatchKey::upper(2, 1)).unwrap();
    let r2_2 = b.find(MatchKey::upper(2, 2)).unwrap();
    assert_eq!((r2_1.home, r2_1.away), (Some(a), None));
    assert_eq!((r2_2.home, r2_2.away), (Some(c), None));
    assert_eq!(r2_1.status, MatchStatus::Pending);
    assert_eq!(r2_2.status, MatchStatus::Pending);
    assert!(b.find(MatchKey::upper(3, 1)).unwrap().home.is_none());
}

#[test]
fn double_elimination_byes_drop_no_loser() {
    let slots = vec![Some(solo()), None, Some(solo()), Some(solo())];
    let (t, mut b) = bracket(TournamentFormat::DoubleElimination, &slots);
    let outcome = resolve_byes(&mut b, t.format).unwrap();
    assert_eq!(outcome.placements.len(), 1);
    let lower = b.find(MatchKey::lower(1, 1)).unwrap();
    assert_eq!((lower.home, lower.away), (None, None));
}

#[test]
fn advancing_from_a_missing_match_reports_a_conflict() {
    let (t, mut b) = bracket(TournamentFormat::SingleElimination, &full(4));
    let outcome = advance(&mut b, t.format, MatchKey::upper(5, 1)).unwrap();
    assert_eq!(outcome.conflicts, vec![MatchKey::upper(5, 1)]);
    assert!(outcome.placements.is_empty());
    assert!(!outcome.tournament_completed);
}
