/// A platform-independent key identifier. A concrete `Platform` implementor
/// (e.g. a `minifb`-backed one in the `app` crate) maps its own key enum onto
/// this one; the core never sees a windowing-library type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Num0, Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9,
    Up, Down, Left, Right,
    Space, Enter, Escape, Tab, Backspace, Delete, Grave,
    LeftShift, RightShift, LeftCtrl, RightCtrl, LeftAlt, RightAlt,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
}

/// A mouse button, for the rare case (middle-click teleport) where the editor
/// cares which one fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
