use log::info;

use crate::db::store::{Collection, RecordStore, to_record};
use crate::error::StoreResult;
use crate::models::{Area, Halqa, Member};

const DEMO_AREAS: &[(&str, &str, &str)] = &[
    ("north", "North Area", "#4f8fd6"),
    ("south", "South Area", "#d68a4f"),
    ("east", "East Area", "#5cae74"),
    ("west", "West Area", "#b45ad6"),
];

const DEMO_HALQAS: &[(&str, &str)] = &[
    ("south", "BLR SOUTH-Bannerghatta Gents Halqa"),
    ("south", "BLR SOUTH-Bannerghatta Ladies Halqa"),
    ("south", "BLR SOUTH-Electronic City Gents Halqa"),
    ("south", "BLR SOUTH-Electronic City Ladies Halqa"),
    ("south", "BLR SOUTH-Koramangala Ladies Halqa"),
    ("south", "BLR SOUTH-Madiwala Gents Halqa"),
    ("east", "BLR EAST-Bellandur Gents Halqa"),
    ("east", "BLR EAST-Bellandur Ladies Halqa"),
    ("east", "BLR EAST-Kagadasapura Gents Halqa"),
    ("east", "BLR EAST-LBS Ladies Halqa"),
    ("east", "BLR EAST-Mahadevapura Gents Halqa"),
    ("east", "BLR EAST-Mahadevapura Ladies Halqa"),
    ("east", "BLR EAST-Marathahalli Gents Halqa"),
    ("east", "BLR EAST-Sarjapura Gents Halqa"),
    ("east", "BLR EAST-Sarjapura Ladies Halqa"),
    ("east", "BLR EAST-Vignan Nagar Ladies Halqa"),
    ("east", "BLR EAST-Whitefield Gents Halqa"),
    ("east", "BLR EAST-Whitefield Ladies Halqa"),
    ("west", "BLR WEST-Kengeri Gents Halqa"),
    ("west", "BLR WEST-Kengeri Ladies Halqa"),
    ("west", "BLR WEST-Majestic Ladies Halqa"),
    ("west", "BLR WEST-Nagarbhavi Gents Halqa"),
    ("west", "BLR WEST-Nagarbhavi Ladies Halqa"),
    ("north", "BLR NORTH-Banaswadi Gents Halqa"),
    ("north", "BLR NORTH-BEL Road Gents Halqa"),
    ("north", "BLR NORTH-BEL Road Ladies Halqa"),
    ("north", "BLR NORTH-Coles Park Gents Halqa"),
    ("north", "BLR NORTH-Coles Park Ladies Halqa"),
    ("north", "BLR NORTH-Hegde Nagar Gents Halqa"),
    ("north", "BLR NORTH-Hegde Nagar Ladies Halqa"),
    ("north", "BLR NORTH-Kammanahalli Ladies Halqa"),
    ("north", "BLR NORTH-RT Nagar Gents Halqa"),
    ("north", "BLR NORTH-RT Nagar Ladies Halqa"),
    ("north", "BLR NORTH-Yelahanka Gents Halqa"),
];

/// Demo halqas get between five and eight placeholder members.
fn demo_members(halqa_id: &str, n: usize) -> Vec<Member> {
    (0..5 + n % 4)
        .map(|i| Member {
            id: format!("m-{halqa_id}-{i}"),
            name: format!("Member {}", i + 1),
            halqa_id: Some(halqa_id.to_string()),
        })
        .collect()
}

pub fn demo_data(meeting_day: &str) -> (Vec<Area>, Vec<Halqa>) {
    let areas = DEMO_AREAS
        .iter()
        .map(|(id, name, color)| Area {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect();

    let halqas = DEMO_HALQAS
        .iter()
        .enumerate()
        .map(|(n, (area_id, name))| {
            let id = format!("h-{}", n + 1);
            Halqa {
                members: demo_members(&id, n),
                id,
                area_id: area_id.to_string(),
                name: name.to_string(),
                meeting_day: meeting_day.to_string(),
            }
        })
        .collect();

    (areas, halqas)
}

/// Inserts the demo areas and halqas unless the store already has areas.
/// Returns the number of halqas inserted.
pub fn seed_demo<S: RecordStore + ?Sized>(store: &S, meeting_day: &str) -> StoreResult<usize> {
    if !store.query(Collection::Areas, &[])?.is_empty() {
        info!("Store already has areas, skipping seed");
        return Ok(0);
    }

    let (areas, halqas) = demo_data(meeting_day);
    let area_records = areas.iter().map(to_record).collect::<StoreResult<Vec<_>>>()?;
    let halqa_records = halqas.iter().map(to_record).collect::<StoreResult<Vec<_>>>()?;

    store.insert(Collection::Areas, area_records)?;
    let inserted = store.insert(Collection::Halqas, halqa_records)?.len();
    info!("Seeded {} areas and {} halqas", areas.len(), inserted);
    Ok(inserted)
}
