//! Random neighbourhood moves over a set of route sequences.
//!
//! Each move touches at most two routes and returns the rewritten copies,
//! so the caller re-runs the route fold only on those.
//!
//! - relocate: one value to another position (any route)
//! - pair relocate: a same-route pair moved together, order kept
//! - swap: two values exchanged between routes
//! - 2-opt: a segment of one route reversed (Croes, 1958)

use rand::Rng;

use crate::engine::DeclaredModel;

/// Rewritten routes produced by one move: `(variable id, new sequence)`.
pub(super) type Changes = Vec<(usize, Vec<usize>)>;

/// Draws one random move; `None` if the drawn move is a no-op.
pub(super) fn random_move<R: Rng>(
    model: &DeclaredModel,
    routes: &[Vec<usize>],
    slots: &[usize],
    rng: &mut R,
) -> Option<Changes> {
    match rng.random_range(0..4u32) {
        0 => relocate(model, routes, slots, rng),
        1 => swap(routes, slots, rng),
        2 => two_opt(routes, slots, rng),
        _ => pair_relocate(model, routes, slots, rng),
    }
}

fn pick_non_empty<R: Rng>(routes: &[Vec<usize>], slots: &[usize], rng: &mut R) -> Option<usize> {
    let used: Vec<usize> = slots
        .iter()
        .copied()
        .filter(|&var| !routes[var].is_empty())
        .collect();
    if used.is_empty() {
        return None;
    }
    Some(used[rng.random_range(0..used.len())])
}

/// Moves a single value; paired values are delegated to [`pair_relocate`].
fn relocate<R: Rng>(
    model: &DeclaredModel,
    routes: &[Vec<usize>],
    slots: &[usize],
    rng: &mut R,
) -> Option<Changes> {
    let from = pick_non_empty(routes, slots, rng)?;
    let pos = rng.random_range(0..routes[from].len());
    let value = routes[from][pos];
    if model.same_route_partner(value).is_some() {
        return pair_relocate(model, routes, slots, rng);
    }

    let to = slots[rng.random_range(0..slots.len())];
    let mut source = routes[from].clone();
    source.remove(pos);
    if to == from {
        let at = rng.random_range(0..=source.len());
        if at == pos {
            return None;
        }
        source.insert(at, value);
        return Some(vec![(from, source)]);
    }
    let mut target = routes[to].clone();
    let at = rng.random_range(0..=target.len());
    target.insert(at, value);
    Some(vec![(from, source), (to, target)])
}

/// Moves a pickup and its delivery to random positions of one route,
/// pickup first.
fn pair_relocate<R: Rng>(
    model: &DeclaredModel,
    routes: &[Vec<usize>],
    slots: &[usize],
    rng: &mut R,
) -> Option<Changes> {
    let from = pick_non_empty(routes, slots, rng)?;
    let value = routes[from][rng.random_range(0..routes[from].len())];
    let partner = model.same_route_partner(value)?;
    let (first, second) = if model.pickup_of(value) == Some(partner) {
        (partner, value)
    } else {
        (value, partner)
    };

    let to = slots[rng.random_range(0..slots.len())];
    let mut changes: Changes = Vec::with_capacity(3);
    // the partner may sit in a third route after a bad move
    for &var in slots {
        if routes[var].contains(&first) || routes[var].contains(&second) {
            let kept = routes[var]
                .iter()
                .copied()
                .filter(|&v| v != first && v != second)
                .collect();
            changes.push((var, kept));
        }
    }

    let base = match changes.iter().position(|(var, _)| *var == to) {
        Some(idx) => changes.remove(idx).1,
        None => routes[to].clone(),
    };
    let mut target = base;
    let i = rng.random_range(0..=target.len());
    target.insert(i, first);
    let j = rng.random_range((i + 1)..=target.len());
    target.insert(j, second);
    changes.push((to, target));
    Some(changes)
}

/// Exchanges two values between two distinct routes.
fn swap<R: Rng>(routes: &[Vec<usize>], slots: &[usize], rng: &mut R) -> Option<Changes> {
    let a = pick_non_empty(routes, slots, rng)?;
    let b = pick_non_empty(routes, slots, rng)?;
    if a == b {
        return None;
    }
    let pa = rng.random_range(0..routes[a].len());
    let pb = rng.random_range(0..routes[b].len());
    let mut ra = routes[a].clone();
    let mut rb = routes[b].clone();
    std::mem::swap(&mut ra[pa], &mut rb[pb]);
    Some(vec![(a, ra), (b, rb)])
}

/// Reverses `route[i..=j]`.
fn two_opt<R: Rng>(routes: &[Vec<usize>], slots: &[usize], rng: &mut R) -> Option<Changes> {
    let var = pick_non_empty(routes, slots, rng)?;
    let n = routes[var].len();
    if n < 2 {
        return None;
    }
    let i = rng.random_range(0..n - 1);
    let j = rng.random_range((i + 1)..n);
    let mut route = routes[var].clone();
    route[i..=j].reverse();
    Some(vec![(var, route)])
}
