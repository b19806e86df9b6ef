//! Tests for tile records and identities

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use tesselate::imaging::ops::rgb_to_proxy;
    use tesselate::spatial::{Tile, TileId};

    // Tests identities display as their raw string
    // Verified by wrapping the identity in quotes
    #[test]
    fn test_identity_display() {
        let id = TileId::from("photos/cat.jpg");
        assert_eq!(id.to_string(), "photos/cat.jpg");
        assert_eq!(id.as_str(), "photos/cat.jpg");
        assert_eq!(TileId::from(String::from("a")), TileId::new("a"));
    }

    // Tests identities order lexically
    // Verified by deriving order from string length
    #[test]
    fn test_identity_order() {
        let mut ids = vec![TileId::from("b"), TileId::from("aa"), TileId::from("a")];
        ids.sort();
        assert_eq!(ids, vec![TileId::from("a"), TileId::from("aa"), TileId::from("b")]);
    }

    // Tests a tile exposes what it was built from
    // Verified by dropping the thumbnail in the constructor
    #[test]
    fn test_tile_accessors() {
        let proxy = rgb_to_proxy(&RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])));
        let tile = Tile::new(TileId::from("t"), proxy.clone(), 9.0);
        assert_eq!(tile.identity().as_str(), "t");
        assert_eq!(tile.thumbnail(), Some(&proxy));
        assert!((tile.mean() - 9.0).abs() < f64::EPSILON);
    }

    // Tests tiles may be carried without comparison pixels
    // Verified by substituting an empty thumbnail
    #[test]
    fn test_tile_without_thumbnail() {
        let tile = Tile::without_thumbnail(TileId::from("gone"), 12.5);
        assert!(tile.thumbnail().is_none());
        assert!((tile.mean() - 12.5).abs() < f64::EPSILON);
    }
}
