// SPDX-License-Identifier: Apache-2.0

//! IO declarations, parameter/variable/net declarations and the parameter
//! port list.

use crate::pt::{
    AttrInstId, DeclHeadSpec, DeclItemId, DeclType, Direction, IOAux, IOHeadSpec, IOItemId,
    NetType, PtArray, PtDeclItem, PtIOItem, PtNodeRef, PtRange, RangeBounds, VarType,
    VsType,
};
use crate::token::{Keyword, TokenPayload};

use super::{PResult, Parser, SyntaxError};

pub(crate) fn net_type_of(kw: Keyword) -> Option<NetType> {
    let t = match kw {
        Keyword::Wire => NetType::Wire,
        Keyword::Tri => NetType::Tri,
        Keyword::Tri0 => NetType::Tri0,
        Keyword::Tri1 => NetType::Tri1,
        Keyword::Wand => NetType::Wand,
        Keyword::Triand => NetType::Triand,
        Keyword::Wor => NetType::Wor,
        Keyword::Trior => NetType::Trior,
        Keyword::Trireg => NetType::Trireg,
        Keyword::Supply0 => NetType::Supply0,
        Keyword::Supply1 => NetType::Supply1,
        _ => return None,
    };
    Some(t)
}

pub(crate) fn var_type_of(kw: Keyword) -> Option<VarType> {
    let t = match kw {
        Keyword::Integer => VarType::Integer,
        Keyword::Real => VarType::Real,
        Keyword::Realtime => VarType::Realtime,
        Keyword::Time => VarType::Time,
        _ => return None,
    };
    Some(t)
}

pub(crate) fn direction_of(kw: Keyword) -> Option<Direction> {
    match kw {
        Keyword::Input => Some(Direction::Input),
        Keyword::Output => Some(Direction::Output),
        Keyword::Inout => Some(Direction::Inout),
        _ => None,
    }
}

/// Keywords that open a declaration other than an IO declaration.
pub(crate) fn is_decl_keyword(kw: Keyword) -> bool {
    net_type_of(kw).is_some()
        || var_type_of(kw).is_some()
        || matches!(
            kw,
            Keyword::Parameter
                | Keyword::Localparam
                | Keyword::Specparam
                | Keyword::Reg
                | Keyword::Event
                | Keyword::Genvar
        )
}

/// What may follow the name of a declared item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemForm {
    /// `name = const_expr`
    Param,
    /// `name {[range]} [= expr]`
    Init,
    /// `name {[range]}`
    Plain,
}

/// Which frame list receives a finished declaration head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadList {
    Decl,
    ParamPort,
}

impl<'a> Parser<'a> {
    /// True when the upcoming `, ident` continues the current item list.
    fn at_item_continuation(&mut self) -> PResult<bool> {
        Ok(self.at(&TokenPayload::Comma)?
            && matches!(
                self.peek_nth(1)?.map(|t| &t.payload),
                Some(TokenPayload::Identifier(_))
            ))
    }

    /// `input|output|inout [reg|net|var] [signed] [range] name [= init], ...`
    ///
    /// With `ansi` the declaration is part of a header port list: it is not
    /// terminated by `;` and stops at a comma followed by a new direction.
    pub(crate) fn parse_io_decl(&mut self, attrs: PtArray<AttrInstId>, ansi: bool) -> PResult<()> {
        let start = self.start_pos()?;
        let tok = self.peek_cloned("port direction")?;
        let dir = match tok.payload {
            TokenPayload::Keyword(kw) => direction_of(kw),
            _ => None,
        };
        let Some(dir) = dir else {
            return Err(self.unexpected("port direction"));
        };
        let kw_region = self.region(tok.span);
        if !ansi {
            match self.frame_kind() {
                Some(kind) if kind.allows_io() => {}
                _ => {
                    return Err(SyntaxError::new(
                        "IO declaration is not allowed here.",
                        kw_region,
                    ))
                }
            }
            if self.frame().ansi_ports {
                return Err(SyntaxError::new(
                    "IO declarations are not allowed when the port list declares the ports.",
                    kw_region,
                ));
            }
        }
        self.pop()?;

        let aux = match self.peek_kw()? {
            Some(Keyword::Reg) => Some(IOAux::Reg),
            Some(kw) => net_type_of(kw)
                .map(IOAux::Net)
                .or_else(|| var_type_of(kw).map(IOAux::Var)),
            None => None,
        };
        let aux = match aux {
            Some(aux) => {
                self.pop()?;
                aux
            }
            None => IOAux::None,
        };
        let signed = self.try_pop_kw(Keyword::Signed)?.is_some();
        let range = self.parse_opt_range()?;
        let fr = self.close(start);

        let pending = self.backend.new_io_head(IOHeadSpec {
            fr,
            dir,
            aux,
            signed,
            range,
            strength: None,
            delay: None,
        });
        let mut items = Vec::new();
        let result = self.parse_io_items(aux, &mut items);
        let item_array = self.alloc(&items);
        let head = self.backend.attach_io_items(pending, item_array);
        self.frame().io_heads.push(head);
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::IOHead(head), attrs);
        }
        result?;
        if !ansi {
            self.expect(TokenPayload::Semi)?;
        }
        Ok(())
    }

    fn parse_io_items(&mut self, aux: IOAux, items: &mut Vec<IOItemId>) -> PResult<()> {
        loop {
            let start = self.start_pos()?;
            let (name, _) = self.expect_ident()?;
            let init_value = if self.try_pop(&TokenPayload::Equals)?.is_some() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let fr = self.close(start);
            if init_value.is_some() && aux != IOAux::Reg {
                self.error(fr, "only an output reg can have an initial value.");
            }
            let prev = self.frame().io_names.get(&name).copied();
            match prev {
                Some(prev) => {
                    let text = self.backend.resolve(name).to_string();
                    self.port_error(
                        fr,
                        &format!(
                            "\"{}\" is redefined (first declared at {}).",
                            text,
                            prev.span().to_human_string()
                        ),
                    );
                }
                None => {
                    self.frame().io_names.insert(name, fr);
                }
            }
            items.push(self.backend.new_io_item(PtIOItem {
                fr,
                name,
                init_value,
            }));
            if !self.at_item_continuation()? {
                return Ok(());
            }
            self.pop()?;
        }
    }

    /// `[signed] [range]` or a variable type after `parameter`/`localparam`.
    fn parse_param_type(&mut self) -> PResult<(bool, Option<RangeBounds>, Option<VarType>)> {
        if let Some(var_type) = self.peek_kw()?.and_then(var_type_of) {
            self.pop()?;
            return Ok((false, None, Some(var_type)));
        }
        let signed = self.try_pop_kw(Keyword::Signed)?.is_some();
        let range = self.parse_opt_range()?;
        Ok((signed, range, None))
    }

    /// Declaration that starts with one of the `is_decl_keyword` keywords.
    pub(crate) fn parse_decl(&mut self, attrs: PtArray<AttrInstId>) -> PResult<()> {
        let start = self.start_pos()?;
        let tok = self.peek_cloned("declaration")?;
        let kw_region = self.region(tok.span);
        let TokenPayload::Keyword(kw) = tok.payload else {
            return Err(self.unexpected("declaration"));
        };
        if !is_decl_keyword(kw) {
            return Err(self.unexpected("declaration"));
        }
        self.pop()?;

        let (mut spec, form) = match kw {
            Keyword::Parameter | Keyword::Localparam => {
                let decl_type = if kw == Keyword::Parameter {
                    DeclType::Param
                } else {
                    DeclType::LocalParam
                };
                let (signed, range, var_type) = self.parse_param_type()?;
                let mut spec = DeclHeadSpec::plain(kw_region, decl_type);
                spec.signed = signed;
                spec.range = range;
                spec.var_type = var_type;
                (spec, ItemForm::Param)
            }
            Keyword::Specparam => {
                let mut spec = DeclHeadSpec::plain(kw_region, DeclType::SpecParam);
                spec.range = self.parse_opt_range()?;
                (spec, ItemForm::Param)
            }
            Keyword::Reg => {
                let mut spec = DeclHeadSpec::plain(kw_region, DeclType::Reg);
                spec.signed = self.try_pop_kw(Keyword::Signed)?.is_some();
                spec.range = self.parse_opt_range()?;
                (spec, ItemForm::Init)
            }
            Keyword::Event => (DeclHeadSpec::plain(kw_region, DeclType::Event), ItemForm::Plain),
            Keyword::Genvar => (DeclHeadSpec::plain(kw_region, DeclType::Genvar), ItemForm::Plain),
            _ => {
                if let Some(var_type) = var_type_of(kw) {
                    let mut spec = DeclHeadSpec::plain(kw_region, DeclType::Var);
                    spec.var_type = Some(var_type);
                    (spec, ItemForm::Init)
                } else {
                    let mut spec = DeclHeadSpec::plain(kw_region, DeclType::Net);
                    spec.net_type = net_type_of(kw);
                    spec.strength = self.parse_opt_strength()?;
                    spec.vs_type = if self.try_pop_kw(Keyword::Vectored)?.is_some() {
                        VsType::Vectored
                    } else if self.try_pop_kw(Keyword::Scalared)?.is_some() {
                        VsType::Scalared
                    } else {
                        VsType::None
                    };
                    spec.signed = self.try_pop_kw(Keyword::Signed)?.is_some();
                    spec.range = self.parse_opt_range()?;
                    spec.delay = self.parse_opt_delay()?;
                    (spec, ItemForm::Init)
                }
            }
        };
        spec.fr = self.close(start);

        if matches!(spec.decl_type, DeclType::Net | DeclType::Genvar) {
            let allowed = self.frame_kind().map_or(false, |k| k.allows_nets());
            if !allowed {
                self.error(
                    kw_region,
                    &format!("{} declaration is not allowed here.", spec.decl_type.as_str()),
                );
            }
        }

        self.build_decl_head(spec, attrs, form, HeadList::Decl)?;
        self.expect(TokenPayload::Semi)?;
        Ok(())
    }

    /// Creates the head, parses its items and attaches them. The head is
    /// completed and recorded even when an item fails to parse.
    fn build_decl_head(
        &mut self,
        spec: DeclHeadSpec,
        attrs: PtArray<AttrInstId>,
        form: ItemForm,
        list: HeadList,
    ) -> PResult<()> {
        let pending = self.backend.new_decl_head(spec);
        let mut items = Vec::new();
        let result = self.parse_decl_items(form, &mut items);
        let item_array = self.alloc(&items);
        let head = self.backend.attach_decl_items(pending, item_array);
        match list {
            HeadList::Decl => self.frame().decl_heads.push(head),
            HeadList::ParamPort => self.frame().paramport_heads.push(head),
        }
        if !attrs.is_empty() {
            self.backend.reg_attrinst(PtNodeRef::DeclHead(head), attrs);
        }
        result
    }

    fn parse_decl_items(&mut self, form: ItemForm, items: &mut Vec<DeclItemId>) -> PResult<()> {
        loop {
            let start = self.start_pos()?;
            let (name, _) = self.expect_ident()?;
            let mut ranges = Vec::new();
            if form != ItemForm::Param {
                while self.at(&TokenPayload::OBrack)? {
                    let range_start = self.start_pos()?;
                    let RangeBounds { left, right } = self.parse_range()?;
                    let fr = self.close(range_start);
                    ranges.push(self.backend.new_range(PtRange { fr, left, right }));
                }
            }
            let init_value = match form {
                ItemForm::Param => {
                    self.expect(TokenPayload::Equals)?;
                    self.const_depth += 1;
                    let value = self.parse_mintypmax();
                    self.const_depth -= 1;
                    Some(value?)
                }
                ItemForm::Init => {
                    if self.try_pop(&TokenPayload::Equals)?.is_some() {
                        Some(self.parse_expr()?)
                    } else {
                        None
                    }
                }
                ItemForm::Plain => None,
            };
            let fr = self.close(start);
            if init_value.is_some() && !ranges.is_empty() {
                self.error(fr, "an array declaration cannot have an initial value.");
            }
            let range_array = self.alloc(&ranges);
            items.push(self.backend.new_decl_item(PtDeclItem {
                fr,
                name,
                init_value,
                range_array,
            }));
            if !self.at_item_continuation()? {
                return Ok(());
            }
            self.pop()?;
        }
    }

    /// `#( parameter ..., parameter ... )` in a module header.
    pub(crate) fn parse_param_port_list(&mut self) -> PResult<()> {
        self.expect(TokenPayload::Hash)?;
        self.expect(TokenPayload::OParen)?;
        loop {
            let attrs = self.parse_attrs()?;
            let start = self.start_pos()?;
            self.expect_kw(Keyword::Parameter)?;
            let (signed, range, var_type) = self.parse_param_type()?;
            let mut spec = DeclHeadSpec::plain(self.close(start), DeclType::Param);
            spec.signed = signed;
            spec.range = range;
            spec.var_type = var_type;
            self.build_decl_head(spec, attrs, ItemForm::Param, HeadList::ParamPort)?;
            if self.try_pop(&TokenPayload::Comma)?.is_none() {
                break;
            }
        }
        self.expect(TokenPayload::CParen)?;
        Ok(())
    }

    /// Return type of a function: `[signed] [range]` or a variable type.
    pub(crate) fn parse_function_type(
        &mut self,
    ) -> PResult<(bool, Option<RangeBounds>, Option<VarType>)> {
        self.parse_param_type()
    }
}
