/// Native rendering of a `FigureSpec`.
pub mod panels;
pub mod parcats;
pub mod plot;
