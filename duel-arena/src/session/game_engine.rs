/// Trait for game engine integration
///
/// The session owns the engine exclusively and drives it from its control
/// loop: actions are applied as they arrive, `tick` is called once per tick,
/// and the field and score are read back to be sent to the peer.
pub trait DuelEngine {
    /// Player input understood by the engine
    type Action: Send;

    /// Apply one player action; illegal actions are ignored by the engine
    fn apply_action(&mut self, action: Self::Action);

    /// Advance one tick (gravity)
    fn tick(&mut self);

    /// Field size as (width, height); the field is `width * height` bytes
    fn field_dims(&self) -> (u16, u16);

    /// Current field, row-major, exactly `width * height` bytes
    fn field_bytes(&self) -> Vec<u8>;

    /// Current score
    fn score(&self) -> u32;

    /// True once a new piece could not be placed
    fn is_topped_out(&self) -> bool;

    /// Field size in bytes
    fn field_len(&self) -> usize {
        let (width, height) = self.field_dims();
        width as usize * height as usize
    }
}
