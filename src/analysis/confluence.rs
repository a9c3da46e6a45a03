use itertools::Itertools;

use crate::config::AggregationConfig;
use crate::models::{ConfluenceZone, EnhancedLine, LevelType, PriceRange, ZoneType};

/// Groups accepted horizontal levels whose price windows overlap into confluence zones.
///
/// Each level gets a window of `zone_width_percent` around its price. Windows are swept in
/// price order and merged while they overlap the zone built so far. Zones with fewer than
/// `min_zone_levels` members are dropped. Output is ordered by price.
pub fn find_confluence_zones(
    lines: &[EnhancedLine],
    config: &AggregationConfig,
) -> Vec<ConfluenceZone> {
    let mut windows: Vec<(PriceRange, &EnhancedLine)> = lines
        .iter()
        .map(|line| {
            (
                PriceRange::around(line.reference_price(), config.zone_width_percent),
                line,
            )
        })
        .collect();
    windows.sort_by(|a, b| {
        a.0.center
            .total_cmp(&b.0.center)
            .then_with(|| a.1.id.cmp(&b.1.id))
    });

    let mut groups: Vec<(PriceRange, Vec<&EnhancedLine>)> = Vec::new();
    for (range, line) in windows {
        match groups.last_mut() {
            Some((zone, members)) if zone.overlaps(&range) => {
                *zone = PriceRange::new(zone.min.min(range.min), zone.max.max(range.max));
                members.push(line);
            }
            _ => groups.push((range, vec![line])),
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= config.min_zone_levels)
        .map(|(price_range, members)| build_zone(price_range, &members))
        .collect()
}

fn build_zone(price_range: PriceRange, members: &[&EnhancedLine]) -> ConfluenceZone {
    let supporting_timeframes: Vec<String> = members
        .iter()
        .flat_map(|line| line.supporting_timeframes.iter().cloned())
        .unique()
        .collect();

    let has_support = members.iter().any(|l| l.level_type() == LevelType::Support);
    let has_resistance = members.iter().any(|l| l.level_type() == LevelType::Resistance);
    let zone_type = match (has_support, has_resistance) {
        (true, true) => ZoneType::Pivot,
        (true, false) => ZoneType::Support,
        _ => ZoneType::Resistance,
    };

    ConfluenceZone {
        price_range,
        strength: members.iter().map(|l| l.strength).sum(),
        timeframe_count: supporting_timeframes.len(),
        supporting_timeframes,
        levels: members.iter().map(|l| (*l).clone()).collect(),
        zone_type,
    }
}
