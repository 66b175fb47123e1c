use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use vroad_terminal::columns::resolve_columns;
use vroad_terminal::directory::{filter_players, filter_techniques, PlayerFilter, PlayerSort, TechniqueFilter};
use vroad_terminal::gviz::parse_gviz;
use vroad_terminal::passives::split_passives;
use vroad_terminal::players::{PlayerStat, StatBlock};
use vroad_terminal::techniques::{self, Technique, TechniqueKind};
use vroad_terminal::text::build_id;
use vroad_terminal::thresholds::{compute_thresholds, StatKey};

static OFFENSIVE_GVIZ: &str = include_str!("../tests/fixtures/gviz_offensive.txt");

const PASSIVE_TEXT: &str = "Quand le joueur tire Gagne 10% ATT Après un tacle réussi Récupère 5 PV \
Si la possession dépasse 60% Gagne 3 DEF Au coup d'envoi Récupère 10 PV \
Lorsqu'un but est encaissé Gagne 8% ATT En gagnant un affrontement Gagne 2 PV";

fn sample_techniques(count: usize) -> Vec<Technique> {
    let columns = resolve_columns(&[], &techniques::schema(TechniqueKind::Offensive));
    let elements = ["Feu", "Vent", "Foudre", "Terre", "Forêt"];
    (0..count)
        .filter_map(|i| {
            let name = format!("Technique {i}");
            let power = format!("{}", 40 + (i * 7) % 90);
            let cells: Vec<vroad_terminal::gviz::GvizCell> = [
                name.as_str(),
                "",
                "",
                elements[i % elements.len()],
                power.as_str(),
                "",
                "Boutique",
                "500",
            ]
            .iter()
            .map(|v| vroad_terminal::gviz::GvizCell { value: v.to_string(), formula: None })
            .collect();
            techniques::normalize_row(TechniqueKind::Offensive, &cells, &columns, i)
        })
        .collect()
}

fn sample_players(count: usize) -> Vec<PlayerStat> {
    (0..count)
        .map(|i| PlayerStat {
            id: build_id(&format!("Player {i}"), i, "player"),
            name: format!("Player {i}"),
            image: None,
            position: ["GK", "DF", "MF", "FW"][i % 4].to_string(),
            element: ["Fire", "Wind", "Wood", "Mountain", "Void"][i % 5].to_string(),
            stats: StatBlock {
                kick: (i % 160) as f64,
                control: ((i * 3) % 150) as f64,
                guard: ((i * 5) % 140) as f64,
                body: ((i * 7) % 130) as f64,
                speed: ((i * 11) % 145) as f64,
                stamina: ((i * 13) % 135) as f64,
                catch: ((i * 17) % 200) as f64,
            },
        })
        .collect()
}

fn bench_gviz_parse(c: &mut Criterion) {
    c.bench_function("gviz_parse", |b| {
        b.iter(|| {
            let table = parse_gviz(black_box(OFFENSIVE_GVIZ)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_passive_segmentation(c: &mut Criterion) {
    c.bench_function("passive_segmentation", |b| {
        b.iter(|| {
            let sentences = split_passives(black_box(PASSIVE_TEXT));
            black_box(sentences.len());
        })
    });
}

fn bench_technique_filtering(c: &mut Criterion) {
    let records = sample_techniques(500);
    let filter = TechniqueFilter {
        query: "technique 1".to_string(),
        element: Some("feu".to_string()),
        min_power: 60.0,
        ..TechniqueFilter::default()
    };
    c.bench_function("technique_filtering", |b| {
        b.iter(|| {
            let view = filter_techniques(black_box(&records), black_box(&filter));
            black_box(view.len());
        })
    });
}

fn bench_player_filter_and_sort(c: &mut Criterion) {
    let records = sample_players(1500);
    let filter = PlayerFilter {
        sort: PlayerSort::Stat(StatKey::Kick),
        ..PlayerFilter::default()
    };
    c.bench_function("player_filter_and_sort", |b| {
        b.iter(|| {
            let view = filter_players(black_box(&records), black_box(&filter));
            black_box(view.len());
        })
    });
}

fn bench_threshold_compute(c: &mut Criterion) {
    let records = sample_players(1500);
    c.bench_function("threshold_compute", |b| {
        b.iter(|| {
            let thresholds = compute_thresholds(black_box(&records));
            black_box(thresholds.cuts(StatKey::Kick));
        })
    });
}

criterion_group!(
    perf,
    bench_gviz_parse,
    bench_passive_segmentation,
    bench_technique_filtering,
    bench_player_filter_and_sort,
    bench_threshold_compute
);
criterion_main!(perf);
