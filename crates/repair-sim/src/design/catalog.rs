//! Built-in catalogue of balanced incomplete block designs
//!
//! Names follow the `v,b,r,k,λ` convention. The block lists are literal; this
//! crate does not construct designs. The `36,42,7,6,1` list has the advertised
//! `v`, `b`, `r` and `k` but some of its blocks meet in more than one share.

use super::BlockDesign;

const FANO_7_7_3_3_1: &[&[u32]] = &[
    &[0, 1, 3],
    &[0, 2, 6],
    &[0, 4, 5],
    &[1, 2, 4],
    &[1, 5, 6],
    &[2, 3, 5],
    &[3, 4, 6],
];

const AFFINE_9_12_4_3_1: &[&[u32]] = &[
    &[0, 3, 6],
    &[0, 4, 7],
    &[2, 4, 6],
    &[6, 7, 8],
    &[0, 5, 8],
    &[3, 4, 5],
    &[2, 3, 8],
    &[2, 5, 7],
    &[1, 4, 8],
    &[1, 3, 7],
    &[0, 1, 2],
    &[1, 5, 6],
];

const PROJECTIVE_13_13_4_4_1: &[&[u32]] = &[
    &[0, 2, 4, 6],
    &[6, 8, 10, 12],
    &[6, 7, 9, 11],
    &[0, 5, 8, 9],
    &[4, 5, 10, 11],
    &[0, 3, 11, 12],
    &[3, 4, 7, 8],
    &[2, 3, 9, 10],
    &[1, 4, 9, 12],
    &[2, 5, 7, 12],
    &[1, 3, 5, 6],
    &[1, 2, 8, 11],
    &[0, 1, 7, 10],
];

const AFFINE_16_20_5_4_1: &[&[u32]] = &[
    &[0, 1, 13, 15],
    &[2, 5, 11, 12],
    &[3, 5, 10, 15],
    &[9, 11, 14, 15],
    &[9, 10, 12, 13],
    &[0, 2, 6, 10],
    &[0, 3, 8, 11],
    &[7, 8, 10, 14],
    &[6, 8, 12, 15],
    &[0, 4, 12, 14],
    &[0, 5, 7, 9],
    &[6, 7, 11, 13],
    &[4, 5, 8, 13],
    &[3, 4, 6, 9],
    &[2, 4, 7, 15],
    &[2, 3, 13, 14],
    &[1, 5, 6, 14],
    &[1, 4, 10, 11],
    &[1, 3, 7, 12],
    &[1, 2, 8, 9],
];

const PROJECTIVE_21_21_5_5_1: &[&[u32]] = &[
    &[2, 4, 7, 9, 10],
    &[2, 5, 11, 16, 20],
    &[0, 1, 10, 11, 12],
    &[1, 9, 13, 16, 17],
    &[3, 10, 13, 15, 20],
    &[0, 9, 14, 19, 20],
    &[1, 4, 8, 18, 20],
    &[7, 8, 11, 13, 14],
    &[1, 5, 7, 15, 19],
    &[6, 8, 10, 16, 19],
    &[6, 7, 12, 17, 20],
    &[0, 4, 5, 6, 13],
    &[3, 5, 8, 9, 12],
    &[3, 4, 11, 17, 19],
    &[1, 2, 3, 6, 14],
    &[5, 10, 14, 17, 18],
    &[2, 12, 13, 18, 19],
    &[4, 12, 14, 15, 16],
    &[6, 9, 11, 15, 18],
    &[0, 3, 7, 16, 18],
    &[0, 2, 8, 15, 17],
];

const AFFINE_25_30_6_5_1: &[&[u32]] = &[
    &[9, 11, 16, 18, 21],
    &[3, 10, 16, 19, 23],
    &[5, 8, 10, 20, 22],
    &[6, 15, 17, 18, 22],
    &[3, 5, 7, 14, 18],
    &[3, 6, 9, 20, 24],
    &[0, 9, 10, 13, 17],
    &[0, 11, 14, 19, 22],
    &[2, 13, 18, 19, 20],
    &[2, 4, 16, 22, 24],
    &[11, 12, 15, 20, 23],
    &[2, 5, 17, 21, 23],
    &[10, 14, 15, 21, 24],
    &[0, 8, 18, 23, 24],
    &[2, 8, 9, 12, 14],
    &[2, 6, 7, 10, 11],
    &[7, 8, 13, 15, 16],
    &[7, 12, 17, 19, 24],
    &[0, 5, 6, 12, 16],
    &[4, 6, 13, 14, 23],
    &[4, 5, 9, 15, 19],
    &[3, 4, 8, 11, 17],
    &[0, 4, 7, 20, 21],
    &[3, 12, 13, 21, 22],
    &[1, 6, 8, 19, 21],
    &[1, 5, 11, 13, 24],
    &[1, 4, 10, 12, 18],
    &[0, 1, 2, 3, 15],
    &[1, 7, 9, 22, 23],
    &[1, 14, 16, 17, 20],
];

const PROJECTIVE_31_31_6_6_1: &[&[u32]] = &[
    &[0, 5, 8, 24, 27, 28],
    &[2, 6, 10, 15, 28, 29],
    &[2, 3, 5, 9, 11, 20],
    &[3, 6, 7, 19, 23, 27],
    &[4, 6, 11, 17, 24, 25],
    &[9, 12, 16, 19, 25, 28],
    &[7, 9, 18, 24, 29, 30],
    &[10, 13, 19, 20, 21, 24],
    &[11, 13, 18, 23, 26, 28],
    &[2, 14, 16, 22, 23, 24],
    &[14, 15, 18, 20, 25, 27],
    &[9, 10, 17, 22, 26, 27],
    &[0, 3, 13, 22, 25, 29],
    &[8, 12, 17, 20, 23, 29],
    &[8, 11, 15, 19, 22, 30],
    &[0, 6, 16, 20, 26, 30],
    &[2, 7, 8, 21, 25, 26],
    &[5, 7, 13, 15, 16, 17],
    &[0, 7, 10, 11, 12, 14],
    &[5, 6, 12, 18, 21, 22],
    &[4, 5, 14, 19, 26, 29],
    &[0, 4, 9, 15, 21, 23],
    &[3, 4, 8, 10, 16, 18],
    &[2, 4, 12, 13, 27, 30],
    &[3, 14, 17, 21, 28, 30],
    &[1, 6, 8, 9, 13, 14],
    &[1, 5, 10, 23, 25, 30],
    &[0, 1, 2, 17, 18, 19],
    &[1, 4, 7, 20, 22, 28],
    &[1, 3, 12, 15, 24, 26],
    &[1, 11, 16, 21, 27, 29],
];

const AFFINE_36_42_7_6_1: &[&[u32]] = &[
    &[2, 4, 10, 12, 29, 35],
    &[2, 5, 8, 24, 29, 35],
    &[0, 3, 10, 13, 29, 35],
    &[2, 6, 9, 13, 29, 35],
    &[4, 17, 20, 24, 29, 35],
    &[2, 7, 14, 17, 29, 35],
    &[3, 6, 8, 14, 29, 35],
    &[3, 7, 12, 16, 28, 34],
    &[4, 7, 8, 15, 28, 34],
    &[5, 11, 12, 14, 24, 34],
    &[9, 11, 20, 23, 28, 34],
    &[10, 11, 19, 23, 28, 34],
    &[13, 15, 19, 23, 28, 34],
    &[14, 18, 19, 23, 28, 34],
    &[0, 14, 19, 23, 28, 33],
    &[17, 18, 19, 23, 27, 33],
    &[6, 15, 20, 23, 24, 33],
    &[18, 19, 20, 22, 27, 33],
    &[16, 18, 19, 22, 27, 33],
    &[0, 12, 15, 17, 27, 33],
    &[7, 9, 20, 22, 24, 33],
    &[12, 13, 18, 22, 27, 32],
    &[9, 10, 14, 15, 16, 32],
    &[8, 11, 13, 16, 17, 32],
    &[8, 10, 18, 22, 27, 32],
    &[8, 9, 12, 22, 27, 32],
    &[0, 6, 7, 11, 26, 32],
    &[5, 7, 13, 22, 26, 32],
    &[5, 6, 10, 17, 26, 31],
    &[4, 6, 16, 21, 26, 31],
    &[0, 4, 5, 9, 26, 31],
    &[3, 5, 15, 21, 26, 31],
    &[3, 4, 11, 21, 26, 31],
    &[2, 3, 18, 21, 25, 31],
    &[1, 7, 10, 21, 25, 31],
    &[1, 6, 12, 21, 25, 30],
    &[1, 5, 16, 21, 25, 30],
    &[0, 2, 16, 20, 24, 30],
    &[1, 4, 13, 14, 25, 30],
    &[1, 3, 9, 17, 25, 30],
    &[0, 1, 8, 20, 24, 30],
    &[1, 2, 11, 15, 25, 30],
];

const CATALOG: &[(&str, &[&[u32]])] = &[
    ("7,7,3,3,1", FANO_7_7_3_3_1),
    ("9,12,4,3,1", AFFINE_9_12_4_3_1),
    ("13,13,4,4,1", PROJECTIVE_13_13_4_4_1),
    ("16,20,5,4,1", AFFINE_16_20_5_4_1),
    ("21,21,5,5,1", PROJECTIVE_21_21_5_5_1),
    ("25,30,6,5,1", AFFINE_25_30_6_5_1),
    ("31,31,6,6,1", PROJECTIVE_31_31_6_6_1),
    ("36,42,7,6,1", AFFINE_36_42_7_6_1),
];

/// Names of every catalogue design, smallest first
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

/// Look up a catalogue design by name
pub fn get(name: &str) -> Option<BlockDesign> {
    CATALOG
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(name, blocks)| build(name, blocks))
}

/// Every catalogue design, smallest first
pub fn all() -> Vec<BlockDesign> {
    CATALOG
        .iter()
        .map(|(name, blocks)| build(name, blocks))
        .collect()
}

fn build(name: &str, blocks: &[&[u32]]) -> BlockDesign {
    BlockDesign::new(blocks.iter().map(|block| block.iter().copied())).with_name(name)
}
