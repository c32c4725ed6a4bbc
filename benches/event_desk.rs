#[cfg(feature = "bench")]
use std::time::Duration;

#[cfg(feature = "bench")]
use chrono::Utc;
#[cfg(feature = "bench")]
use criterion::{Criterion, criterion_group, criterion_main};

#[cfg(feature = "bench")]
use event_desk::{
    export::to_csv,
    participant::{Entry, Member, Participant, Participants},
};

#[cfg(feature = "bench")]
fn roster(size: usize) -> Participants {
    Participants(
        (0..size)
            .map(|i| Participant {
                id: format!("{i:016x}"),
                entry: if i % 3 == 0 {
                    Entry::Team {
                        team_name: format!("Team \"{i}\""),
                        members: (0..4)
                            .map(|j| Member::new(&format!("Member {i}-{j}"), "", ""))
                            .collect(),
                    }
                } else {
                    Entry::Solo {
                        name: format!("Participant {i}"),
                        email: format!("p{i}@example.org"),
                        phone: String::new(),
                    }
                },
                present: i % 2 == 0,
                registered_at: Utc::now(),
            })
            .collect(),
    )
}

#[cfg(feature = "bench")]
fn filter_and_export(c: &mut Criterion) {
    let participants = roster(5_000);

    c.bench_function("filter", |b| {
        b.iter(|| participants.filter("member 42"));
    });

    c.bench_function("export_csv", |b| {
        b.iter(|| to_csv(&participants).unwrap());
    });
}

#[cfg(feature = "bench")]
criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = filter_and_export
}

#[cfg(feature = "bench")]
criterion_main!(benches);

#[cfg(not(feature = "bench"))]
fn main() {
    eprintln!("You must pass `--features=bench`");
}
