use chiptally::action::{Action, Expected};
use chiptally::engine::apply_action;
use chiptally::pot::{build_pots, Pot};
use chiptally::rules::GameRules;
use chiptally::settlement::settle;
use chiptally::table::{Identity, Seat, SeatId, SeatStatus, Stage, Table, TableStatus};
use chiptally::TableError;

fn showdown_table(contrib: &[(&str, u64, SeatStatus)]) -> Table {
    let mut t = Table::new("t1", GameRules::texas(), Some("host".into()));
    for &(id, hand_bet, status) in contrib {
        let mut s = Seat::new(id, id, Some(format!("o-{id}").into()), 0);
        s.hand_bet = hand_bet;
        s.status = status;
        t.seats.push(s);
    }
    t.status = TableStatus::Active;
    t.stage = Stage::Showdown;
    t.pot = contrib.iter().map(|c| c.1).sum();
    t
}

fn ids(v: &[&str]) -> Vec<SeatId> {
    v.iter().map(|&s| SeatId::from(s)).collect()
}

fn host() -> Identity {
    "host".into()
}

#[test]
fn folded_short_contributor_is_dead_money_in_main_pot() {
    let t = showdown_table(&[
        ("p1", 100, SeatStatus::AllIn),
        ("p2", 80, SeatStatus::AllIn),
        ("p3", 20, SeatStatus::Fold),
    ]);
    let pots = build_pots(&t.seats).unwrap();
    assert_eq!(pots[0], Pot { amount: 180, eligible: ids(&["p1", "p2"]) });
    assert_eq!(pots[1], Pot { amount: 20, eligible: ids(&["p1"]) });

    let done = settle(&t, &host(), &Expected::default(), &[ids(&["p2"]), ids(&["p1"])], 0).unwrap();
    assert_eq!(done.seats[0].stack, 20);
    assert_eq!(done.seats[1].stack, 180);
    assert_eq!(done.seats[2].stack, 0);
    assert_eq!(done.seats[2].status, SeatStatus::Out);
}

#[test]
fn odd_chips_follow_selection_order() {
    let three_way = showdown_table(&[
        ("x", 5, SeatStatus::Active),
        ("y", 5, SeatStatus::Active),
        ("z", 5, SeatStatus::Active),
    ]);
    let winners = [ids(&["y", "z", "x"])];
    let done = settle(&three_way, &host(), &Expected::default(), &winners, 0).unwrap();
    let stacks: Vec<u64> = done.seats.iter().map(|s| s.stack).collect();
    assert_eq!(stacks, vec![5, 5, 5]);

    // 3 + 3 + 3 from live seats plus one dead chip from the folded seat
    let ten = showdown_table(&[
        ("x", 3, SeatStatus::Active),
        ("y", 3, SeatStatus::Active),
        ("z", 3, SeatStatus::Active),
        ("f", 1, SeatStatus::Fold),
    ]);
    let pots = build_pots(&ten.seats).unwrap();
    assert_eq!(pots, vec![Pot { amount: 10, eligible: ids(&["x", "y", "z"]) }]);
    let done = settle(&ten, &host(), &Expected::default(), &[ids(&["z", "x", "y"])], 0).unwrap();
    let awards: Vec<u64> = done.seats.iter().map(|s| s.stack).collect();
    assert_eq!(awards, vec![3, 3, 4, 0]);
}

#[test]
fn winners_outside_pot_or_missing_selection_are_rejected() {
    let t = showdown_table(&[
        ("p1", 100, SeatStatus::AllIn),
        ("p2", 50, SeatStatus::AllIn),
        ("p3", 100, SeatStatus::Active),
    ]);
    let err = settle(&t, &host(), &Expected::default(), &[], 0).unwrap_err();
    assert_eq!(err, TableError::NoWinners);
    let err = settle(&t, &host(), &Expected::default(), &[ids(&["p2"])], 0).unwrap_err();
    assert_eq!(err, TableError::NoPotWinner { pot: 1 });
    let winners = [ids(&["p1"]), ids(&["p2"])];
    let err = settle(&t, &host(), &Expected::default(), &winners, 0).unwrap_err();
    assert_eq!(err, TableError::NoPotWinner { pot: 1 });

    let winners = [ids(&["p2"]), ids(&["p3", "p1"])];
    let done = settle(&t, &host(), &Expected::default(), &winners, 0).unwrap();
    assert_eq!(done.seats[1].stack, 150);
    assert_eq!(done.seats[2].stack, 50);
    assert_eq!(done.seats[0].stack, 50);
}

#[test]
fn settle_requires_host_and_showdown() {
    let t = showdown_table(&[("p1", 10, SeatStatus::Active), ("p2", 10, SeatStatus::Active)]);
    let err = settle(&t, &"o-p1".into(), &Expected::default(), &[ids(&["p1"])], 0).unwrap_err();
    assert_eq!(err, TableError::NotHost);

    let mut live = t.clone();
    live.stage = Stage::River;
    let err = settle(&live, &host(), &Expected::default(), &[ids(&["p1"])], 0).unwrap_err();
    assert_eq!(err, TableError::NotShowdown);

    let stale = Expected { settled: Some(true), ..Expected::default() };
    let err = settle(&t, &host(), &stale, &[ids(&["p1"])], 0).unwrap_err();
    assert_eq!(err, TableError::SettledChanged);
}

#[test]
fn all_in_levels_from_live_play() {
    let rules = GameRules::texas();
    let mut t = Table::new("t1", rules, None);
    t.add_seat(Seat::new("a", "", Some("oa".into()), 1000)).unwrap();
    t.add_seat(Seat::new("b", "", Some("ob".into()), 300)).unwrap();
    t.add_seat(Seat::new("c", "", Some("oc".into()), 120)).unwrap();
    let t = chiptally::engine::start(&t, &"anyone".into(), 0).unwrap();
    // dealer a, small blind b, big blind c; a opens
    let raise = Action::Raise { to: 500 };
    let t = apply_action(&t, &"oa".into(), &raise, &Expected::of(&t), 0).unwrap();
    let t = apply_action(&t, &"ob".into(), &Action::AllIn, &Expected::of(&t), 0).unwrap();
    let mut t = apply_action(&t, &"oc".into(), &Action::Call, &Expected::of(&t), 0).unwrap();
    // only a can still act, so it checks each remaining street alone
    assert_eq!(t.stage, Stage::Flop);
    while !t.stage.is_showdown() {
        assert_eq!(t.turn_index, 0);
        t = apply_action(&t, &"oa".into(), &Action::Check, &Expected::of(&t), 0).unwrap();
    }

    let pots = build_pots(&t.seats).unwrap();
    assert_eq!(
        pots,
        vec![
            Pot { amount: 360, eligible: ids(&["a", "b", "c"]) },
            Pot { amount: 360, eligible: ids(&["a", "b"]) },
            Pot { amount: 200, eligible: ids(&["a"]) },
        ]
    );
    let winners = [ids(&["c"]), ids(&["b"]), ids(&["a"])];
    let done = settle(&t, &"anyone".into(), &Expected::of(&t), &winners, 0).unwrap();
    let stacks: Vec<u64> = done.seats.iter().map(|s| s.stack).collect();
    assert_eq!(stacks, vec![700, 360, 360]);
    assert_eq!(stacks.iter().sum::<u64>(), 1420);
}
