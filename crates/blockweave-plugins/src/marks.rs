//! Stock mark descriptors. The first tag of each is what the HTML
//! serializer writes; the rest are accepted on input.

use blockweave_engine::{Mark, MarkDescriptor, RenderNode};

pub fn bold() -> MarkDescriptor {
    MarkDescriptor::new(Mark::Bold, &["strong", "b"])
}

pub fn italic() -> MarkDescriptor {
    MarkDescriptor::new(Mark::Italic, &["em", "i"])
}

pub fn code_mark() -> MarkDescriptor {
    MarkDescriptor::new(Mark::Code, &["code", "kbd"]).with_render(|node| {
        RenderNode::element("code", vec![node]).with_attr("class", "blockweave-code-mark")
    })
}

pub fn underline() -> MarkDescriptor {
    MarkDescriptor::new(Mark::Underline, &["u", "ins"])
}

pub fn strike() -> MarkDescriptor {
    MarkDescriptor::new(Mark::Strike, &["s", "strike", "del"])
}
