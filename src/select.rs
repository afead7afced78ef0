//! Assigning clusters to semantic colour roles.
//!
//! Roles are picked by luminance and saturation rather than by weight: the
//! most common colour of a photo is rarely the best page background.

use crate::color::Rgb;
use crate::kmeans::Cluster;

/// Clusters with saturation at or below this never qualify as leaf.
pub const LEAF_MIN_SATURATION: f32 = 0.18;
/// Hue band (degrees, inclusive) treated as foliage green.
pub const LEAF_HUE_RANGE: std::ops::RangeInclusive<f32> = 70.0..=170.0;

/// The six tones taken straight from clustering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub bg0: Rgb,
    pub bg1: Rgb,
    pub text: Rgb,
    pub accent: Rgb,
    pub accent2: Rgb,
    pub leaf: Rgb,
}

/// Indices into the cluster list for each role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roles {
    pub bg0: usize,
    pub bg1: usize,
    pub text: usize,
    pub accent: usize,
    pub accent2: usize,
    pub leaf: usize,
}

/// Choose role indices, or `None` when there are no clusters.
pub fn pick_roles(clusters: &[Cluster]) -> Option<Roles> {
    if clusters.is_empty() {
        return None;
    }
    let all = || 0..clusters.len();

    let mut by_lum: Vec<usize> = all().collect();
    by_lum.sort_by(|&a, &b| clusters[b].lum.total_cmp(&clusters[a].lum));
    let light1 = by_lum[0];
    let light2 = by_lum.iter().copied().find(|&i| i != light1).unwrap_or(light1);

    let mut by_lum_asc: Vec<usize> = all().collect();
    by_lum_asc.sort_by(|&a, &b| clusters[a].lum.total_cmp(&clusters[b].lum));
    let dark1 = by_lum_asc[0];

    let taken = [light1, light2, dark1];
    let mut mid: Vec<usize> = all().filter(|i| !taken.contains(i)).collect();
    sort_by_saturation_desc(&mut mid, clusters);

    let accent = mid.first().copied().unwrap_or(light2);
    let accent2 = mid.get(1).copied().unwrap_or(accent);

    let mut leafy: Vec<usize> = all()
        .filter(|&i| {
            let hsl = clusters[i].hsl;
            hsl.s > LEAF_MIN_SATURATION && LEAF_HUE_RANGE.contains(&hsl.h)
        })
        .collect();
    sort_by_saturation_desc(&mut leafy, clusters);
    let leaf = leafy.first().copied().unwrap_or(accent2);

    Some(Roles {
        bg0: light1,
        bg1: light2,
        text: dark1,
        accent,
        accent2,
        leaf,
    })
}

/// Pick the palette for `clusters`; `None` means "leave the theme as it is".
pub fn pick_palette(clusters: &[Cluster]) -> Option<Palette> {
    let roles = pick_roles(clusters)?;
    let center = |i: usize| clusters[i].center;
    Some(Palette {
        bg0: center(roles.bg0),
        bg1: center(roles.bg1),
        text: center(roles.text),
        accent: center(roles.accent),
        accent2: center(roles.accent2),
        leaf: center(roles.leaf),
    })
}

fn sort_by_saturation_desc(indices: &mut [usize], clusters: &[Cluster]) {
    indices.sort_by(|&a, &b| clusters[b].hsl.s.total_cmp(&clusters[a].hsl.s));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(rgb: [u8; 3], weight: usize) -> Cluster {
        Cluster::new(rgb.map(f32::from), weight)
    }

    #[test]
    fn no_clusters_no_palette() {
        assert_eq!(pick_roles(&[]), None);
        assert_eq!(pick_palette(&[]), None);
    }

    #[test]
    fn single_cluster_degrades_gracefully() {
        let clusters = [cluster([120, 100, 80], 10)];
        let roles = pick_roles(&clusters).unwrap();
        assert_eq!(roles, Roles { bg0: 0, bg1: 0, text: 0, accent: 0, accent2: 0, leaf: 0 });

        let palette = pick_palette(&clusters).unwrap();
        assert_eq!(palette.bg1, palette.bg0);
        assert_eq!(palette.accent, palette.bg1);
        assert_eq!(palette.accent2, palette.bg1);
    }

    #[test]
    fn two_clusters_use_secondary_background_as_accents() {
        let clusters = [cluster([40, 20, 10], 10), cluster([230, 220, 200], 10)];
        let roles = pick_roles(&clusters).unwrap();
        assert_eq!(roles.bg0, 1);
        assert_eq!(roles.bg1, 0);
        assert_eq!(roles.text, 0);
        assert_eq!(roles.accent, 0);
        assert_eq!(roles.accent2, 0);
        assert_eq!(roles.leaf, 0);
    }

    #[test]
    fn roles_follow_luminance_and_saturation() {
        let clusters = [
            cluster([128, 120, 110], 90), // dull mid tone, heaviest
            cluster([250, 245, 235], 40), // lightest
            cluster([20, 18, 15], 30),    // darkest
            cluster([220, 210, 190], 20), // second lightest
            cluster([200, 60, 40], 10),   // saturated red
            cluster([60, 160, 60], 5),    // green
        ];
        let roles = pick_roles(&clusters).unwrap();
        assert_eq!(roles.bg0, 1);
        assert_eq!(roles.bg1, 3);
        assert_eq!(roles.text, 2);
        assert_eq!(roles.accent, 4);
        assert_eq!(roles.accent2, 5);
        assert_eq!(roles.leaf, 5);
    }

    #[test]
    fn leaf_falls_back_to_second_accent() {
        let clusters = [
            cluster([250, 245, 235], 10),
            cluster([20, 18, 15], 10),
            cluster([220, 210, 190], 10),
            cluster([200, 60, 40], 10),
            cluster([40, 60, 200], 10),
        ];
        let roles = pick_roles(&clusters).unwrap();
        assert_eq!(roles.leaf, roles.accent2);
    }

    #[test]
    fn desaturated_green_is_not_leaf() {
        let clusters = [
            cluster([250, 245, 235], 10),
            cluster([20, 18, 15], 10),
            cluster([110, 120, 110], 10),
        ];
        let roles = pick_roles(&clusters).unwrap();
        assert!(clusters[2].hsl.s <= LEAF_MIN_SATURATION);
        assert_eq!(roles.leaf, roles.accent2);
    }
}
