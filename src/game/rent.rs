/// Rent owed on a square with `houses` houses (5 = hotel).
pub fn rent(base_rent: i64, houses: u8) -> i64 {
    match houses {
        0 => base_rent,
        1 => base_rent * 5,
        2 => base_rent * 15,
        3 => base_rent * 45,
        4 => base_rent * 80,
        5 => base_rent * 125,
        // Unreachable while the house cap holds.
        n => base_rent * (n as i64 + 1),
    }
}
